mod matches;
mod players;

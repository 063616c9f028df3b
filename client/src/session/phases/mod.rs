pub mod choose_character;
pub mod connect;
pub mod leave_server;
pub mod logoff_character;
pub mod play_game;

pub mod config_cmd;
pub mod detect;
pub mod load;
pub mod track;

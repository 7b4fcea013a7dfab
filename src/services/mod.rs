pub mod providers;
pub mod recommendations;
pub mod song_search;

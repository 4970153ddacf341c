pub mod line;
pub mod model {
    pub mod game;
    pub mod messages;
}
pub mod utility;

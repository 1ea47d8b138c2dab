pub mod auth;
pub mod backup;
pub mod codec;
pub mod commands;
pub mod firestore;
pub mod models;
pub mod uploader;
pub mod winners;

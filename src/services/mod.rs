pub mod like_api;

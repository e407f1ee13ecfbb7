#![allow(dead_code)]

pub mod checkpoint_server;

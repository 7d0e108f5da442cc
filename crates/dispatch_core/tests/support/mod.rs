#![allow(dead_code)]

pub mod service;

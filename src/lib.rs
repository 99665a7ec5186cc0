#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! awsops: one-off ECS tasks (`ecs-run`) and SSM parameter trees as YAML (`param-tool`).

pub mod aws;
pub mod cli;
pub mod commands;
pub mod params;
pub mod task;
pub mod types;

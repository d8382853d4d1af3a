pub mod aws_config;

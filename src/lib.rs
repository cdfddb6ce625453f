pub mod error;

pub mod service {
    pub mod config_service;
    pub mod embed;
    pub mod image;
    pub mod observer;
    pub mod tracer;
    pub mod traits {
        pub mod i_service;
    }
}

pub mod config {
    pub mod config;
    pub mod ports;
}

pub mod models {
    pub mod conversion;
    pub mod embed;
    pub mod trace;
}

pub mod facade {
    pub mod conversion_facade;
    pub mod traits {
        pub mod i_conversion;
    }
}

pub mod action {
    pub mod cli;
    pub mod interactive;
}

pub mod utils {
    pub mod file;
    pub mod pool;
    pub mod utils;
}

pub mod config;
pub mod cycle;
pub mod fetch;
pub mod kpi;
pub mod layout;
pub mod liveboard;
pub mod model;
pub mod output;
pub mod route;
pub mod trains;

/// UI module exports
pub mod components;
pub mod configurator;
pub mod popup;

mod batching;
mod config;
mod custom_scheduler;
mod debounce;

mod engine;
mod integration;

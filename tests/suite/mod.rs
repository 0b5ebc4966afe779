mod config;
mod guard;
mod reconcile;
mod session;

pub mod event_sync;

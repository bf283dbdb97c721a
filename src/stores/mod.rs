pub mod peer_store;

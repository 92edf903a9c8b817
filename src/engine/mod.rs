// Vaultdesk Engine — pool position logic and its chain transport.

pub mod pool;

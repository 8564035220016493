//! Data module - Price bars, file loading and simulated feeds

mod bar;
mod feed;
mod loader;
mod processor;

pub use bar::{Direction, PriceBar};
pub use feed::{
    find_symbol, session_label, BarSource, SimulatedFeed, StaticBars, WatchlistEntry,
    MARKET_WATCHLIST,
};
pub use loader::{BarLoader, LoaderError};
pub use processor::{BarProcessor, ProcessorError};

//! Market data acquisition: provider contract, Yahoo provider, batch fetcher,
//! column flattening and CSV persistence.

pub mod download;
pub mod frame;
pub mod progress;
pub mod provider;
pub mod series;
pub mod sink;
pub mod yahoo;

pub use download::{combine, fetch_all, BatchReport, CombinedOutput, FailureReason, FetchOutcome};
pub use frame::{ColumnKey, ProviderFrame};
pub use progress::{DownloadProgress, LogProgress, SilentProgress};
pub use provider::{DataError, DataProvider, DateRange};
pub use series::{PriceRow, PriceSeries};
pub use sink::{read_series, sanitize_identifier, CsvSink, COMBINED_FILE_NAME};
pub use yahoo::YahooProvider;

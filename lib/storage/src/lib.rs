pub mod store;
pub mod stamp;
pub mod writer;

pub use store::{exists_and_nonempty, CsvStore, Snapshot};
pub use stamp::{resolve_stamped_path, resolve_stamped_path_now, FILENAME_TIMESTAMP_FORMAT};
pub use writer::{append_record, AppendChange, AppendOptions, AppendOutcome, DatasetWriter};

mod confirm_dialog;
mod form;
mod list;
mod table;
mod text_input;

pub use confirm_dialog::{ConfirmDialog, ConfirmEvent};
pub use form::{Form, FormEvent};
pub use list::{List, ListEvent, ListRow};
pub use table::{ColumnDef, Table, TableEvent, TableRow};
pub use text_input::TextInput;

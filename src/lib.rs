//! Age calculator form core: calendar arithmetic, a timezone-aware clock,
//! field validation and the form state machine that ties them together.

pub mod age;
pub mod clock;
pub mod command;
pub mod config;
pub mod form;
pub mod render;
pub mod storage;
pub mod theme;
pub mod validate;

pub use age::{CalendarDate, CalendarError, DateDifference, difference_ymd, is_leap_year, max_days_in_month};
pub use clock::{Clock, ClockReading, ClockTicker, FixedClock, SystemClock};
pub use form::{Field, Form, FormSnapshot, FormValues, RootError, SubmitOutcome};
pub use theme::{Theme, ThemePreference};
pub use validate::{FieldError, validate_all, validate_field};

//! Statistical utilities shared by the counterpick crates.
//!
//! - **Descriptive statistics**: mean, median, variance and standard deviation of a
//!   sample. The feature pipeline fits its z-score scalers from these values and the
//!   trainer uses them to summarise evaluation runs.
//! - **Label balance**: counting a binary label column and reporting the share of the
//!   positive class (see [`balance`]).
//!
//! # Examples
//!
//! ```
//! use counterpick_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! ```
//!
//! ```
//! use counterpick_stats::balance::LabelBalance;
//!
//! let balance = LabelBalance::from_labels([true, false, false, true, true]);
//! assert_eq!(balance.positive, 3);
//! assert_eq!(balance.minority_count(), 2);
//! ```

pub mod balance;
pub mod descriptive;

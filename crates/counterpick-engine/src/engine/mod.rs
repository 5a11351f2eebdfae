pub use self::battle::*;

mod battle;

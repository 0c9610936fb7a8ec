use crate::error::BoxError;
use std::fmt;

/// A runnable unit of work: the up or down half of a migration.
///
/// Implemented for any `Fn() -> Result<(), E>` closure or function whose
/// error converts into [`BoxError`], so most migrations are registered as
/// plain closures.
pub trait Step: Send + Sync {
    fn run(&self) -> Result<(), BoxError>;
}

impl<F, E> Step for F
where
    F: Fn() -> Result<(), E> + Send + Sync,
    E: Into<BoxError>,
{
    fn run(&self) -> Result<(), BoxError> {
        self().map_err(Into::into)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => f.write_str("up"),
            Direction::Down => f.write_str("down"),
        }
    }
}

/// An identified pair of up/down steps. Immutable once registered.
pub struct Migration {
    id: String,
    up: Box<dyn Step>,
    down: Box<dyn Step>,
}

impl Migration {
    pub fn new(id: impl Into<String>, up: impl Step + 'static, down: impl Step + 'static) -> Self {
        Self {
            id: id.into(),
            up: Box::new(up),
            down: Box::new(down),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn step(&self, direction: Direction) -> &dyn Step {
        match direction {
            Direction::Up => self.up.as_ref(),
            Direction::Down => self.down.as_ref(),
        }
    }
}

impl fmt::Debug for Migration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Migration").field("id", &self.id).finish()
    }
}

/// Anything migrations can be registered with.
///
/// Lets migration sets be written against the narrow registration surface:
///
/// ```rust,ignore
/// pub fn register(r: &mut impl Register) {
///     r.register("create_users", create_users, drop_users);
/// }
/// ```
pub trait Register {
    fn register(&mut self, id: impl Into<String>, up: impl Step + 'static, down: impl Step + 'static);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn failing() -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::Other, "disk full"))
    }

    #[test]
    fn closures_are_steps() {
        let step = || -> Result<(), String> { Ok(()) };
        assert!(step.run().is_ok());
    }

    #[test]
    fn fn_items_are_steps() {
        let err = failing.run().unwrap_err();
        assert_eq!(err.to_string(), "disk full");
    }

    #[test]
    fn step_selects_direction() {
        let m = Migration::new(
            "a",
            || -> Result<(), &'static str> { Ok(()) },
            || -> Result<(), &'static str> { Err("no way back") },
        );
        assert_eq!(m.id(), "a");
        assert!(m.step(Direction::Up).run().is_ok());
        assert_eq!(
            m.step(Direction::Down).run().unwrap_err().to_string(),
            "no way back"
        );
    }

    #[test]
    fn direction_display() {
        assert_eq!(Direction::Up.to_string(), "up");
        assert_eq!(Direction::Down.to_string(), "down");
    }
}

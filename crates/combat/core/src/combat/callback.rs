//! Scripted hooks invoked during resolution.
//!
//! Hooks are supplied by the scripting host as trait objects. Every
//! invocation first reserves a slot on the shared [`ScriptStack`]; when the
//! stack is exhausted the hook is skipped and the built-in output stays at
//! its default.

use std::cell::Cell;
use std::fmt;
use std::sync::Arc;

use crate::error::{CombatFault, ErrorSeverity};
use crate::state::{CreatureSnapshot, Position};

/// Errors raised by scripted hooks.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CallbackError {
    /// Too many hooks are already running.
    #[error("script call stack overflow at depth {depth}")]
    StackOverflow { depth: usize },

    /// The hook itself reported a failure.
    #[error("script failed: {0}")]
    Script(String),
}

impl CombatFault for CallbackError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Internal
    }

    fn error_code(&self) -> &'static str {
        match self {
            CallbackError::StackOverflow { .. } => "CALLBACK_STACK_OVERFLOW",
            CallbackError::Script(_) => "CALLBACK_SCRIPT_FAILED",
        }
    }
}

/// Inputs handed to a value hook, by formula flavour.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ValueInput {
    LevelMagic {
        level: u32,
        magic_level: u32,
    },
    Skill {
        skill: u32,
        attack: i32,
        attack_factor: f32,
    },
}

/// Supplies the min/max range for a player's hit.
pub trait ValueCallback: Send + Sync {
    fn min_max(&self, player: &CreatureSnapshot, input: ValueInput) -> Result<(i32, i32), CallbackError>;
}

/// Runs once per affected location.
pub trait TileCallback: Send + Sync {
    fn on_tile(&self, caster: Option<&CreatureSnapshot>, position: Position) -> Result<(), CallbackError>;
}

/// Runs once per affected creature.
pub trait TargetCallback: Send + Sync {
    fn on_target(&self, caster: Option<&CreatureSnapshot>, target: &CreatureSnapshot) -> Result<(), CallbackError>;
}

/// Which value formula a value hook replaces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueHookKind {
    LevelMagic,
    Skill,
}

/// Registration request for [`crate::Combat::set_callback`].
#[derive(Clone)]
pub enum CallbackHandle {
    LevelMagicValue(Arc<dyn ValueCallback>),
    SkillValue(Arc<dyn ValueCallback>),
    TargetTile(Arc<dyn TileCallback>),
    TargetCreature(Arc<dyn TargetCallback>),
}

/// Hooks attached to one combat definition.
#[derive(Clone, Default)]
pub struct CombatCallbacks {
    pub value: Option<(ValueHookKind, Arc<dyn ValueCallback>)>,
    pub tile: Option<Arc<dyn TileCallback>>,
    pub target: Option<Arc<dyn TargetCallback>>,
}

impl CombatCallbacks {
    pub fn set(&mut self, handle: CallbackHandle) {
        match handle {
            CallbackHandle::LevelMagicValue(hook) => self.value = Some((ValueHookKind::LevelMagic, hook)),
            CallbackHandle::SkillValue(hook) => self.value = Some((ValueHookKind::Skill, hook)),
            CallbackHandle::TargetTile(hook) => self.tile = Some(hook),
            CallbackHandle::TargetCreature(hook) => self.target = Some(hook),
        }
    }
}

impl fmt::Debug for CombatCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CombatCallbacks")
            .field("value", &self.value.as_ref().map(|(kind, _)| kind))
            .field("tile", &self.tile.is_some())
            .field("target", &self.target.is_some())
            .finish()
    }
}

/// Depth-limited reservation counter shared by every hook invocation.
#[derive(Debug)]
pub struct ScriptStack {
    depth: Cell<usize>,
    limit: usize,
}

impl ScriptStack {
    pub fn new(limit: usize) -> Self {
        Self {
            depth: Cell::new(0),
            limit,
        }
    }

    pub fn depth(&self) -> usize {
        self.depth.get()
    }

    /// Reserves one frame, released when the guard drops.
    ///
    /// # Errors
    ///
    /// Returns `CallbackError::StackOverflow` when `limit` frames are already in use.
    pub fn reserve(&self) -> Result<ScriptFrame<'_>, CallbackError> {
        let depth = self.depth.get();
        if depth >= self.limit {
            return Err(CallbackError::StackOverflow { depth });
        }
        self.depth.set(depth + 1);
        Ok(ScriptFrame { stack: self })
    }

    /// Runs `hook` inside a reserved frame.
    ///
    /// Failures are logged and swallowed; the caller keeps its default output.
    pub fn invoke<T>(&self, hook: &'static str, call: impl FnOnce() -> Result<T, CallbackError>) -> Option<T> {
        let result = self.reserve().and_then(|_frame| call());
        match result {
            Ok(value) => Some(value),
            Err(err @ CallbackError::StackOverflow { .. }) => {
                tracing::error!(hook, error = %err, "skipping scripted hook");
                None
            }
            Err(err) => {
                tracing::warn!(hook, error = %err, "scripted hook failed");
                None
            }
        }
    }
}

/// Held while a hook runs.
#[derive(Debug)]
pub struct ScriptFrame<'a> {
    stack: &'a ScriptStack,
}

impl Drop for ScriptFrame<'_> {
    fn drop(&mut self) {
        self.stack.depth.set(self.stack.depth.get().saturating_sub(1));
    }
}

// -------------------------------------------------------------------------
// SPDX-FileCopyrightText: Copyright © 2025 The Ovum VM Project
// SPDX-FileName: crates/ovum-vm/src/exec.rs
// SPDX-FileType: SOURCE
// SPDX-License-Identifier: Apache-2.0
// -------------------------------------------------------------------------
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
// -------------------------------------------------------------------------
//! The execution tree: the polymorphic node family the parser builds and
//! the interpreter walks.

use std::fmt;

use ovum_runtime::{RuntimeError, Value};

use crate::context::ExecutionContext;
use crate::outcome::{ExecOutcome, ExecutionOutcome};

/// Handler signature of a leaf command.
pub type CommandFn = Box<dyn Fn(&mut ExecutionContext<'_>) -> ExecOutcome>;

/// A leaf opcode.
///
/// The prologue requires a live frame and charges one action to it; the
/// wrapped handler then performs the opcode's documented stack effect.
pub struct Command {
    name: &'static str,
    run: CommandFn,
}

impl Command {
    /// Wraps a handler under the opcode's display name.
    #[must_use]
    pub fn new(name: &'static str, run: CommandFn) -> Self {
        Self { name, run }
    }

    /// The opcode name, for diagnostics.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Executes the command.
    pub fn execute(&self, ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
        let Some(frame) = ctx.memory.stack_frames.top_mut() else {
            return Err(RuntimeError::NoActiveFrame { op: self.name.to_string() });
        };
        frame.action_count += 1;
        (self.run)(ctx)
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command").field("name", &self.name).finish_non_exhaustive()
    }
}

/// An ordered list of executables, run in order.
///
/// The first non-`Normal` outcome stops the block and propagates.
#[derive(Debug, Default)]
pub struct Block {
    statements: Vec<Executable>,
}

impl Block {
    /// Creates an empty block.
    #[must_use]
    pub const fn new() -> Self {
        Self { statements: Vec::new() }
    }

    /// Appends a statement.
    pub fn push(&mut self, statement: Executable) {
        self.statements.push(statement);
    }

    /// Number of direct statements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Whether the block has no statements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Runs the statements in order.
    pub fn execute(&self, ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
        for statement in &self.statements {
            let outcome = statement.execute(ctx)?;
            if outcome != ExecutionOutcome::Normal {
                return Ok(outcome);
            }
        }
        Ok(ExecutionOutcome::Normal)
    }
}

/// One guarded branch: a condition block and a body block.
///
/// Runs the condition, pops the boolean it left on top, and either runs
/// the body or reports `ConditionFalse` for `IfMultibranch` to try the
/// next branch.
#[derive(Debug)]
pub struct ConditionalExecution {
    condition: Block,
    body: Block,
}

impl ConditionalExecution {
    /// Creates a branch from its condition and body blocks.
    #[must_use]
    pub const fn new(condition: Block, body: Block) -> Self {
        Self { condition, body }
    }

    /// Evaluates the branch.
    pub fn execute(&self, ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
        let outcome = self.condition.execute(ctx)?;
        if outcome != ExecutionOutcome::Normal {
            return Ok(outcome);
        }
        match ctx.memory.machine_stack.pop("ConditionalExecution")? {
            Value::Bool(true) => self.body.execute(ctx),
            Value::Bool(false) => Ok(ExecutionOutcome::ConditionFalse),
            other => Err(RuntimeError::type_mismatch(
                "ConditionalExecution",
                "bool",
                other.tag_name(),
            )),
        }
    }
}

/// An `if`/`else if`/`else` chain.
///
/// Branches are tried in order; the first whose outcome is not
/// `ConditionFalse` wins. A source-level `else` is lowered by the parser
/// into a final branch whose condition pushes `true`, so the optional
/// else block here only exists for trees built programmatically.
#[derive(Debug, Default)]
pub struct IfMultibranch {
    branches: Vec<ConditionalExecution>,
    else_block: Option<Block>,
}

impl IfMultibranch {
    /// Creates an empty multibranch.
    #[must_use]
    pub const fn new() -> Self {
        Self { branches: Vec::new(), else_block: None }
    }

    /// Appends a branch.
    pub fn add_branch(&mut self, branch: ConditionalExecution) {
        self.branches.push(branch);
    }

    /// Installs the else block.
    pub fn set_else_block(&mut self, block: Block) {
        self.else_block = Some(block);
    }

    /// Evaluates branches in order.
    pub fn execute(&self, ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
        for branch in &self.branches {
            let outcome = branch.execute(ctx)?;
            if outcome != ExecutionOutcome::ConditionFalse {
                return Ok(outcome);
            }
        }
        match &self.else_block {
            Some(block) => block.execute(ctx),
            None => Ok(ExecutionOutcome::Normal),
        }
    }
}

/// A `while … then …` loop.
#[derive(Debug)]
pub struct WhileExecution {
    condition: Block,
    body: Block,
}

impl WhileExecution {
    /// Creates a loop from its condition and body blocks.
    #[must_use]
    pub const fn new(condition: Block, body: Block) -> Self {
        Self { condition, body }
    }

    /// Re-evaluates the condition each iteration and runs the body while
    /// it holds. `Break` ends the loop normally, `Continue` restarts it,
    /// `Return` propagates.
    pub fn execute(&self, ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
        loop {
            let outcome = self.condition.execute(ctx)?;
            if outcome != ExecutionOutcome::Normal {
                return Ok(outcome);
            }
            match ctx.memory.machine_stack.pop("WhileExecution")? {
                Value::Bool(true) => {}
                Value::Bool(false) => return Ok(ExecutionOutcome::Normal),
                other => {
                    return Err(RuntimeError::type_mismatch(
                        "WhileExecution",
                        "bool",
                        other.tag_name(),
                    ));
                }
            }
            match self.body.execute(ctx)? {
                ExecutionOutcome::Break => return Ok(ExecutionOutcome::Normal),
                ExecutionOutcome::Return => return Ok(ExecutionOutcome::Return),
                ExecutionOutcome::Normal | ExecutionOutcome::Continue => {}
                ExecutionOutcome::ConditionFalse => {
                    return Ok(ExecutionOutcome::ConditionFalse);
                }
            }
        }
    }
}

/// A node of the execution tree.
#[derive(Debug)]
pub enum Executable {
    /// An ordered statement list.
    Block(Block),
    /// A guarded branch.
    Conditional(ConditionalExecution),
    /// An `if`/`else if`/`else` chain.
    If(IfMultibranch),
    /// A `while` loop.
    While(WhileExecution),
    /// A leaf opcode.
    Command(Command),
}

impl Executable {
    /// Executes the node.
    pub fn execute(&self, ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
        match self {
            Self::Block(block) => block.execute(ctx),
            Self::Conditional(branch) => branch.execute(ctx),
            Self::If(multibranch) => multibranch.execute(ctx),
            Self::While(while_loop) => while_loop.execute(ctx),
            Self::Command(command) => command.execute(ctx),
        }
    }
}

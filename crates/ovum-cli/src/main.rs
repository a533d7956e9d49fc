// -------------------------------------------------------------------------
// SPDX-FileCopyrightText: Copyright © 2025 The Ovum VM Project
// SPDX-FileName: crates/ovum-cli/src/main.rs
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
//! Ovum VM CLI
//!
//! Command-line driver: loads a bytecode listing, parses it, runs it, and
//! maps the entry function's result onto the process exit code.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use ovum_parser::{ParserOptions, parse_program, tokenize};
use ovum_runtime::{DEFAULT_GC_THRESHOLD, VirtualTableStore};
use ovum_vm::{
    Executor, FunctionStore, NullJitExecutorFactory, VmIo, register_builtin_functions,
    register_builtin_vtables,
};

const DEFAULT_JIT_BOUNDARY: u64 = 10_000;

/// The Ovum bytecode virtual machine
#[derive(Parser, Debug)]
#[clap(version, about, long_about = None)]
struct Args {
    /// Bytecode source file to execute
    #[clap(short = 'f', long = "file")]
    file: PathBuf,

    /// Action-count boundary past which functions are handed to the JIT
    #[clap(short = 'j', long = "jit-boundary", default_value_t = DEFAULT_JIT_BOUNDARY)]
    jit_boundary: u64,

    /// Live-object count that triggers a garbage collection
    #[clap(long, default_value_t = DEFAULT_GC_THRESHOLD)]
    gc_threshold: usize,

    /// Arguments passed through to the guest program (after --)
    #[clap(last = true)]
    program_args: Vec<String>,
}

fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();
    match run(&args) {
        Ok(code) => ExitCode::from((code & 0xff) as u8),
        Err(error) => {
            eprintln!("ovum: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<i64> {
    let source = std::fs::read_to_string(&args.file)
        .with_context(|| format!("cannot read {}", args.file.display()))?;

    let mut vtables = VirtualTableStore::new();
    let mut functions = FunctionStore::new();
    register_builtin_vtables(&mut vtables).context("built-in class installation failed")?;
    register_builtin_functions(&mut functions)
        .context("built-in function installation failed")?;

    let tokens = tokenize(&source).context("lexical analysis failed")?;
    info!("lexed {} tokens from {}", tokens.len(), args.file.display());

    let jit_factory = NullJitExecutorFactory;
    let options = ParserOptions { jit_factory: &jit_factory, jit_boundary: args.jit_boundary };
    let init_static = parse_program(&tokens, &mut functions, &mut vtables, &options)
        .context("parsing failed")?
        .context("the program has no init-static block")?;

    info!(
        "parsed program: {} functions, {} classes",
        functions.len(),
        vtables.len()
    );

    let mut executor = Executor::new(vtables, functions, VmIo::stdio(), args.gc_threshold);
    executor
        .run_program(&init_static, &args.program_args)
        .context("execution failed")
}

// -------------------------------------------------------------------------
// SPDX-FileCopyrightText: Copyright © 2025 The Ovum VM Project
// SPDX-FileName: crates/ovum-vm/src/commands/system.rs
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
//! Time, sleep, randomness, environment, and system-information opcodes.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use ovum_runtime::{RuntimeError, Value};
use rand::{Rng, RngCore, SeedableRng};

use super::{pop_float, pop_int, pop_string, push};
use crate::context::ExecutionContext;
use crate::outcome::{ExecOutcome, ExecutionOutcome};

fn since_epoch(op: &str) -> Result<Duration, RuntimeError> {
    SystemTime::now().duration_since(UNIX_EPOCH).map_err(|error| RuntimeError::io(op, error))
}

pub(crate) fn unix_time(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let seconds = since_epoch("UnixTime")?.as_secs() as i64;
    push(ctx, Value::Int(seconds));
    Ok(ExecutionOutcome::Normal)
}

pub(crate) fn unix_time_ms(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let millis = since_epoch("UnixTimeMs")?.as_millis() as i64;
    push(ctx, Value::Int(millis));
    Ok(ExecutionOutcome::Normal)
}

pub(crate) fn unix_time_ns(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let nanos = since_epoch("UnixTimeNs")?.as_nanos() as i64;
    push(ctx, Value::Int(nanos));
    Ok(ExecutionOutcome::Normal)
}

/// Monotonic nanoseconds since the executor started.
pub(crate) fn nano_time(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let nanos = ctx.start_time.elapsed().as_nanos() as i64;
    push(ctx, Value::Int(nanos));
    Ok(ExecutionOutcome::Normal)
}

pub(crate) fn sleep_ms(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let millis = pop_int(ctx, "SleepMs")?;
    std::thread::sleep(Duration::from_millis(millis.max(0) as u64));
    Ok(ExecutionOutcome::Normal)
}

pub(crate) fn sleep_ns(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let nanos = pop_int(ctx, "SleepNs")?;
    std::thread::sleep(Duration::from_nanos(nanos.max(0) as u64));
    Ok(ExecutionOutcome::Normal)
}

// --- Randomness ---

pub(crate) fn random(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let value = ctx.rng.next_u64() as i64;
    push(ctx, Value::Int(value));
    Ok(ExecutionOutcome::Normal)
}

/// `[... min max] → [... n]` with `min <= n < max`.
pub(crate) fn random_range(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let max = pop_int(ctx, "RandomRange")?;
    let min = pop_int(ctx, "RandomRange")?;
    if min >= max {
        return Err(RuntimeError::other(format!("RandomRange: empty range [{min}, {max})")));
    }
    let value = ctx.rng.gen_range(min..max);
    push(ctx, Value::Int(value));
    Ok(ExecutionOutcome::Normal)
}

/// Pushes a float in `[0, 1)`.
pub(crate) fn random_float(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let value: f64 = ctx.rng.gen_range(0.0..1.0);
    push(ctx, Value::Float(value));
    Ok(ExecutionOutcome::Normal)
}

/// `[... min max] → [... x]` with `min <= x < max`.
pub(crate) fn random_float_range(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let max = pop_float(ctx, "RandomFloatRange")?;
    let min = pop_float(ctx, "RandomFloatRange")?;
    if !(min < max) {
        return Err(RuntimeError::other(format!("RandomFloatRange: empty range [{min}, {max})")));
    }
    let value = ctx.rng.gen_range(min..max);
    push(ctx, Value::Float(value));
    Ok(ExecutionOutcome::Normal)
}

pub(crate) fn seed_random(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let seed = pop_int(ctx, "SeedRandom")?;
    *ctx.rng = rand::rngs::StdRng::seed_from_u64(seed as u64);
    Ok(ExecutionOutcome::Normal)
}

// --- Environment and system information ---

pub(crate) fn get_os_name(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let reference = ctx.alloc_string(std::env::consts::OS)?;
    push(ctx, Value::Object(reference));
    Ok(ExecutionOutcome::Normal)
}

/// The host does not expose a portable version string.
pub(crate) fn get_os_version(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let reference = ctx.alloc_string("unknown")?;
    push(ctx, Value::Object(reference));
    Ok(ExecutionOutcome::Normal)
}

pub(crate) fn get_architecture(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let reference = ctx.alloc_string(std::env::consts::ARCH)?;
    push(ctx, Value::Object(reference));
    Ok(ExecutionOutcome::Normal)
}

pub(crate) fn get_user_name(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());
    let reference = ctx.alloc_string(user)?;
    push(ctx, Value::Object(reference));
    Ok(ExecutionOutcome::Normal)
}

pub(crate) fn get_home_directory(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_default();
    let reference = ctx.alloc_string(home)?;
    push(ctx, Value::Object(reference));
    Ok(ExecutionOutcome::Normal)
}

pub(crate) fn get_process_id(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    push(ctx, Value::Int(i64::from(std::process::id())));
    Ok(ExecutionOutcome::Normal)
}

/// Pops a variable name; pushes its value, or an empty string if unset.
pub(crate) fn get_environment_variable(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let name = pop_string(ctx, "GetEnvironmentVariable")?;
    let value = std::env::var(&name).unwrap_or_default();
    let reference = ctx.alloc_string(value)?;
    push(ctx, Value::Object(reference));
    Ok(ExecutionOutcome::Normal)
}

/// `[... name value] → [...]`
pub(crate) fn set_environment_variable(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let value = pop_string(ctx, "SetEnvironmentVariable")?;
    let name = pop_string(ctx, "SetEnvironmentVariable")?;
    // SAFETY: the VM is single-threaded by contract; no other thread can
    // be reading the environment concurrently.
    unsafe {
        std::env::set_var(name, value);
    }
    Ok(ExecutionOutcome::Normal)
}

pub(crate) fn get_processor_count(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    let count = std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get);
    push(ctx, Value::Int(count as i64));
    Ok(ExecutionOutcome::Normal)
}

pub(crate) fn get_memory_usage(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    push(ctx, Value::Int(ctx.heap.bytes_in_use() as i64));
    Ok(ExecutionOutcome::Normal)
}

pub(crate) fn get_peak_memory_usage(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    push(ctx, Value::Int(ctx.heap.peak_bytes() as i64));
    Ok(ExecutionOutcome::Normal)
}

pub(crate) fn force_garbage_collection(ctx: &mut ExecutionContext<'_>) -> ExecOutcome {
    ctx.run_collection()?;
    Ok(ExecutionOutcome::Normal)
}

/// Terminates the program with the given code from the bytecode immediate.
///
/// Unwinds as [`RuntimeError::Exit`] so every frame is popped on the way
/// out; the executor turns the code into the process exit status.
pub(crate) fn exit(_ctx: &mut ExecutionContext<'_>, code: i64) -> ExecOutcome {
    Err(RuntimeError::Exit(code))
}

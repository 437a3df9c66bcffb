// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// VkPlayground
// Opens a window and renders the command sequence of a session.

use anyhow::Result;
use clap::Parser;
use playground_sdk::{Playground, PlaygroundConfig};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "vkplayground", version, about)]
struct Cli {
    /// RON configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// RON session applied at startup. Overrides the config file.
    #[arg(long)]
    session: Option<PathBuf>,

    /// Log filter, in `RUST_LOG` syntax (e.g. `debug` or `playground_core=trace`).
    #[arg(long)]
    log: Option<String>,
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    let cli = Cli::parse();

    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));
    builder
        .filter_module("wgpu_hal", log::LevelFilter::Warn)
        .filter_module("wgpu_core", log::LevelFilter::Warn)
        .filter_module("naga", log::LevelFilter::Warn);
    if let Some(filter) = &cli.log {
        builder.parse_filters(filter);
    }
    builder.init();

    log::info!("Welcome to your playground!");

    let mut config = match &cli.config {
        Some(path) => PlaygroundConfig::load(path)?,
        None => PlaygroundConfig::default(),
    };
    if let Some(session) = cli.session {
        config.session = Some(session);
    }

    Playground::new(config).run()
}

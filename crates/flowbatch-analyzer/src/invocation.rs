//! Tool command line construction.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::ToolConfig;

/// One fully resolved tool command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    /// Program to execute.
    pub program: PathBuf,
    /// Arguments in order.
    pub args: Vec<OsString>,
    /// Input file being analyzed.
    pub input: PathBuf,
    /// Report file the tool is asked to write.
    pub report: PathBuf,
}

impl ToolConfig {
    /// Builds the command line analyzing `input` into `report`.
    pub fn invocation(&self, input: &Path, report: &Path) -> ToolInvocation {
        let mut args: Vec<OsString> = Vec::with_capacity(16);

        if let Some(classpath) = &self.classpath {
            args.push("-cp".into());
            args.push(classpath.into());
        }
        args.push(self.main_class.clone().into());

        args.push("-a".into());
        args.push(input.into());
        args.push("-p".into());
        args.push(self.platform_jar.clone().into());
        args.push("-s".into());
        args.push(self.sources_sinks.clone().into());
        args.push(self.precision_flag.clone().into());
        args.push("-o".into());
        args.push(report.into());

        let timeouts = [
            ("-dt", self.data_flow_timeout),
            ("-ct", self.callback_timeout),
            ("-rt", self.result_timeout),
        ];
        for (flag, secs) in timeouts {
            if let Some(secs) = secs {
                args.push(flag.into());
                args.push(secs.to_string().into());
            }
        }

        if let Some(mode) = self.path_reconstruction {
            args.push("-pr".into());
            args.push(mode.as_ref().into());
        }

        args.extend(self.tool_args.iter().map(OsString::from));

        ToolInvocation {
            program: self.executable.clone(),
            args,
            input: input.to_path_buf(),
            report: report.to_path_buf(),
        }
    }
}

impl fmt::Display for ToolInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

use std::io::{self, Write};
use std::sync::Arc;

use crate::config::Config;
use crate::convert::HELM_BIN;
use crate::error::{MigrateError, Result};
use crate::log::{Log, TracingLog};
use crate::process::{Process, ProcessRunner, SystemRunner};
use crate::steps::Step;

/// Plan step that prints `helm list --output json`.
pub struct List {
    helm_command: String,
    debug: bool,
    global_flags: Vec<String>,
    runner: Arc<dyn ProcessRunner>,
    log: Arc<dyn Log>,
    out: Box<dyn Write>,
    cmd: Option<Box<dyn Process>>,
}

impl List {
    /// Creates a List using fields from the given Config. No validation is
    /// performed at this time.
    pub fn new(cfg: &Config) -> Self {
        Self::with_runner(
            cfg,
            Arc::new(SystemRunner),
            Arc::new(TracingLog),
            Box::new(io::stdout()),
        )
    }

    pub fn with_runner(
        cfg: &Config,
        runner: Arc<dyn ProcessRunner>,
        log: Arc<dyn Log>,
        out: Box<dyn Write>,
    ) -> Self {
        Self {
            helm_command: cfg.helm_command.clone(),
            debug: cfg.debug,
            global_flags: global_flags(cfg),
            runner,
            log,
            out,
            cmd: None,
        }
    }
}

/// Flags shared by every helm invocation, only emitted when set.
pub fn global_flags(cfg: &Config) -> Vec<String> {
    let mut flags = Vec::new();
    if cfg.debug {
        flags.push("--debug".to_string());
    }
    if !cfg.namespace.is_empty() {
        flags.push("--namespace".to_string());
        flags.push(cfg.namespace.clone());
    }
    if !cfg.kube_config.is_empty() {
        flags.push("--kubeconfig".to_string());
        flags.push(cfg.kube_config.clone());
    }
    if !cfg.kube_context.is_empty() {
        flags.push("--kube-context".to_string());
        flags.push(cfg.kube_context.clone());
    }
    flags
}

impl Step for List {
    fn prepare(&mut self) -> Result<()> {
        let mut args = self.global_flags.clone();
        args.extend(["list".to_string(), "--output".to_string(), "json".to_string()]);

        let cmd = self.runner.command(HELM_BIN, args);
        if self.debug {
            self.log.info(&format!("Generated command: '{cmd}'"));
        }
        self.cmd = Some(cmd);
        Ok(())
    }

    fn execute(&mut self) -> Result<()> {
        if self.cmd.is_none() {
            self.prepare()?;
        }
        let Some(cmd) = self.cmd.as_mut() else {
            return Ok(());
        };

        cmd.run()?;
        self.out.write_all(cmd.stdout().as_bytes())?;
        self.out.flush()?;

        if self.helm_command == "list" {
            return Ok(());
        }
        Err(MigrateError::UnknownCommand(self.helm_command.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::RecordingLog;
    use crate::process::scripted::{Reply, ScriptedRunner};
    use std::sync::Mutex;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn list(cfg: &Config, runner: &ScriptedRunner) -> (List, SharedBuf, Arc<RecordingLog>) {
        let out = SharedBuf::default();
        let log = Arc::new(RecordingLog::new());
        let step = List::with_runner(
            cfg,
            Arc::new(runner.clone()),
            log.clone(),
            Box::new(out.clone()),
        );
        (step, out, log)
    }

    #[test]
    fn new_list_keeps_helm_command() {
        let cfg = Config {
            helm_command: "everybody dance NOW!!".into(),
            ..Config::default()
        };
        let l = List::new(&cfg);
        assert_eq!(l.helm_command, "everybody dance NOW!!");
    }

    #[test]
    fn prepare_builds_list_command() {
        let runner = ScriptedRunner::default();
        let (mut l, _, log) = list(&Config::default(), &runner);

        l.prepare().unwrap();

        assert_eq!(l.cmd.as_ref().unwrap().to_string(), "helm list --output json");
        assert!(log.lines().is_empty());
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn prepare_prefixes_global_flags_and_logs_in_debug() {
        let cfg = Config {
            debug: true,
            namespace: "apps".into(),
            kube_config: "/root/.kube/config".into(),
            kube_context: "prod".into(),
            ..Config::default()
        };
        let runner = ScriptedRunner::default();
        let (mut l, _, log) = list(&cfg, &runner);

        l.prepare().unwrap();

        let expected = "helm --debug --namespace apps --kubeconfig /root/.kube/config \
                        --kube-context prod list --output json";
        assert_eq!(l.cmd.as_ref().unwrap().to_string(), expected);
        assert_eq!(log.lines(), vec![format!("Generated command: '{expected}'")]);
    }

    #[test]
    fn execute_prints_output_and_rejects_other_commands() {
        let runner = ScriptedRunner::new(vec![Reply::ok("[]\n"), Reply::ok("[]\n")]);
        let cfg = Config {
            helm_command: "list".into(),
            ..Config::default()
        };
        let (mut l, out, _) = list(&cfg, &runner);

        l.prepare().unwrap();
        l.execute().unwrap();
        assert_eq!(out.text(), "[]\n");

        l.helm_command = "get down on friday".into();
        let err = l.execute().unwrap_err();
        assert_eq!(err.to_string(), "unknown command 'get down on friday'");
        assert_eq!(runner.calls().len(), 2);
    }

    #[test]
    fn execute_without_prepare_still_runs() {
        let runner = ScriptedRunner::new(vec![Reply::fail("Error: Kubernetes cluster unreachable")]);
        let cfg = Config {
            helm_command: "list".into(),
            ..Config::default()
        };
        let (mut l, out, _) = list(&cfg, &runner);

        let err = l.execute().unwrap_err();

        assert_eq!(
            err.to_string(),
            "while running 'helm list --output json': Error: Kubernetes cluster unreachable"
        );
        assert!(out.text().is_empty());
    }
}

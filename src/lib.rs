//! Installer for the kube-cli command line tool.
//!
//! The binary (`kube-cli-install`) is a thin wrapper around
//! [`install::run_install`]; the workflow pieces are public so they can be
//! driven with fake host, privilege and keyboard implementations.

pub mod config;
pub mod install;

use clap::Args;
use serde::Serialize;

use stagehand::config::ProjectConfig;
use stagehand::pipeline::PipelineReport;
use stagehand::provision::{
    self, AliasResult, DatabaseProvisionResult, DecommissionResult, TlsResult,
};
use stagehand::session::Session;

use super::CmdResult;

#[derive(Args)]
pub struct AliasArgs {
    /// Alias domain name
    pub alias: String,

    /// Include the www. subdomain
    #[arg(long)]
    pub include_www: bool,
}

#[derive(Serialize)]
pub struct ProvisionOutput {
    pub command: String,
}

#[derive(Serialize)]
pub struct ProvisionAllOutput {
    pub command: String,
    pub report: PipelineReport,
}

#[derive(Serialize)]
pub struct DatabaseOutput {
    pub command: String,
    #[serde(flatten)]
    pub result: DatabaseProvisionResult,
}

#[derive(Serialize)]
pub struct TlsOutput {
    pub command: String,
    #[serde(flatten)]
    pub result: TlsResult,
}

#[derive(Serialize)]
pub struct AliasOutput {
    pub command: String,
    #[serde(flatten)]
    pub result: AliasResult,
}

#[derive(Serialize)]
pub struct DecommissionOutput {
    pub command: String,
    #[serde(flatten)]
    pub result: DecommissionResult,
}

pub fn checkout(config: &ProjectConfig) -> CmdResult<ProvisionOutput> {
    let mut local = Session::local();
    let mut remote = Session::remote(config.host()?);
    provision::checkout_on_remote(config, &mut local, &mut remote)?;

    Ok((
        ProvisionOutput {
            command: "checkout-on-remote".to_string(),
        },
        0,
    ))
}

pub fn create_environment(config: &ProjectConfig) -> CmdResult<ProvisionOutput> {
    let mut remote = Session::remote(config.host()?);
    provision::create_remote_environment(config, &mut remote)?;

    Ok((
        ProvisionOutput {
            command: "create-remote-environment".to_string(),
        },
        0,
    ))
}

pub fn create_database(config: &ProjectConfig) -> CmdResult<DatabaseOutput> {
    let mut remote = Session::remote(config.host()?);
    let result = provision::create_database_and_config(config, &mut remote)?;

    Ok((
        DatabaseOutput {
            command: "create-database-and-config".to_string(),
            result,
        },
        0,
    ))
}

pub fn create_host(config: &ProjectConfig) -> CmdResult<ProvisionOutput> {
    let mut remote = Session::remote(config.host()?);
    provision::register_virtual_host(config, &mut remote)?;

    Ok((
        ProvisionOutput {
            command: "create-remote-host".to_string(),
        },
        0,
    ))
}

pub fn enable_unit(config: &ProjectConfig) -> CmdResult<ProvisionOutput> {
    let mut remote = Session::remote(config.host()?);
    provision::enable_service_unit(config, &mut remote)?;

    Ok((
        ProvisionOutput {
            command: "enable-service-unit".to_string(),
        },
        0,
    ))
}

pub fn run_all(config: &ProjectConfig) -> CmdResult<ProvisionAllOutput> {
    let report = provision::provision_host(config)?;

    Ok((
        ProvisionAllOutput {
            command: "run-all-provisioning-steps".to_string(),
            report,
        },
        0,
    ))
}

pub fn activate_tls(config: &ProjectConfig) -> CmdResult<TlsOutput> {
    let result = provision::activate_tls(config)?;

    Ok((
        TlsOutput {
            command: "activate-tls".to_string(),
            result,
        },
        0,
    ))
}

pub fn add_alias(args: AliasArgs, config: &ProjectConfig) -> CmdResult<AliasOutput> {
    let result = provision::add_domain_alias(config, &args.alias, args.include_www)?;

    Ok((
        AliasOutput {
            command: "add-domain-alias".to_string(),
            result,
        },
        0,
    ))
}

pub fn remove_alias(args: AliasArgs, config: &ProjectConfig) -> CmdResult<AliasOutput> {
    let result = provision::remove_domain_alias(config, &args.alias, args.include_www)?;

    Ok((
        AliasOutput {
            command: "remove-domain-alias".to_string(),
            result,
        },
        0,
    ))
}

pub fn decommission(config: &ProjectConfig) -> CmdResult<DecommissionOutput> {
    let result = provision::decommission_host(config)?;

    Ok((
        DecommissionOutput {
            command: "decommission-host".to_string(),
            result,
        },
        0,
    ))
}

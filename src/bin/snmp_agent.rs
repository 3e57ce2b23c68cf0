//! snmp-agent: Serve managed objects over SNMP v1/v2c.

use std::process::ExitCode;

use clap::Parser;
use tiny_snmp_agent::Agent;
use tiny_snmp_agent::cli::args::AgentArgs;

#[tokio::main]
async fn main() -> ExitCode {
    let args = AgentArgs::parse();

    args.init_tracing();

    let mut builder = Agent::builder()
        .bind(args.bind.clone())
        .communities(&args.communities);
    for (oid, object) in args.objects() {
        builder = builder.object(oid, object);
    }

    let agent = match builder.build().await {
        Ok(agent) => agent,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    eprintln!(
        "listening on {} ({} objects)",
        agent.local_addr(),
        agent.mib().len()
    );

    let cancel = agent.cancel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    match agent.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

pub mod config;
pub mod entities;
pub mod events;
pub mod trigger_effects;

use aws_config::BehaviorVersion;
use aws_lambda_events::event::s3::S3Event;
use config::Config;
use entities::DispatchReport;
use events::process_lambda_event;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use simple_error::simple_error;
use trigger_effects::dispatching::{remote::SfnEngine, Dispatcher, WorkflowEngine};
use trigger_effects::generate_trigger_effects;

pub async fn handler<E: WorkflowEngine>(
    event: LambdaEvent<S3Event>,
    config: &Config,
    dispatcher: &Dispatcher<E>,
) -> Result<DispatchReport, Error> {
    let (notifications, budget) = process_lambda_event(event);
    generate_trigger_effects(
        notifications,
        &config.filter_rule,
        dispatcher,
        &config.retry_policy,
        budget,
    )
    .await
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        // disable printing the name of the module in every log line.
        .with_target(false)
        // disabling time is handy because CloudWatch will add the ingestion time.
        .without_time()
        .init();
    let config = Config::from_env().map_err(|e| Box::new(simple_error!(format!("{:?}", e))))?;
    let aws_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let dispatcher = Dispatcher::new(
        SfnEngine::new(aws_sdk_sfn::Client::new(&aws_config)),
        &config.state_machine_arn,
        config.start_timeout,
    );
    let config = &config;
    let dispatcher = &dispatcher;
    run(service_fn(move |event: LambdaEvent<S3Event>| async move {
        handler(event, config, dispatcher).await
    }))
    .await
}

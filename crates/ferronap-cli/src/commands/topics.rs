use std::time::Duration;

use ferronap_core::{Onap, TopicConsumer, TopicName};
use serde_json::{json, Value};

use crate::cli::{ConsumeArgs, TopicsCommand};
use crate::error::CliError;

pub async fn run(command: &TopicsCommand, onap: &Onap) -> Result<Value, CliError> {
    match command {
        TopicsCommand::List => {
            let topics = onap.dmaap().topics().await?;
            Ok(json!({ "topics": topics }))
        }
        TopicsCommand::Consume(args) => consume(args, onap).await,
    }
}

async fn consume(args: &ConsumeArgs, onap: &Onap) -> Result<Value, CliError> {
    let topic = TopicName::parse(&args.topic)?;
    let messages = TopicConsumer::new(
        onap.dmaap().clone(),
        topic.clone(),
        args.group.as_str(),
        args.consumer_id.as_str(),
    )?
    .consume_for(Duration::from_secs(args.seconds))
    .await?;

    Ok(json!({
        "topic": topic,
        "count": messages.len(),
        "messages": messages,
    }))
}

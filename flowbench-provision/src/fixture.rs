//! Builds and submits the benchmark flow.
//!
//! The flow is a straight line of three components:
//!
//! ```text
//! ChatInput -> ArtificialDelay -> ChatOutput
//! ```
//!
//! The delay component sleeps for half a second and stamps its output with a nanosecond
//! timestamp, so that every run really executes and no two responses are identical.
//!
//! The payload is minimal: the input and output nodes carry no component code and the edges
//! name no handles. Tests cover the payload shape only, not whether a particular Langflow
//! version builds the graph.

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use flowbench_client::Session;
use flowbench_types::flow::{
    ComponentNode, Edge, FlowData, GENERIC_NODE, NewFlow, Node, NodeData, Position, TemplateField,
};

use crate::error::{ProvisionError, ProvisionResult};

const INPUT_NODE: &str = "ChatInput-bench";
const DELAY_NODE: &str = "ArtificialDelay-bench";
const OUTPUT_NODE: &str = "ChatOutput-bench";

const DESCRIPTION: &str = "Echo flow with an artificial 0.5s delay, created for benchmarking.";

/// Component code of the delay node, executed by the service.
pub const DELAY_COMPONENT: &str = r#"import time

from langflow.custom import Component
from langflow.io import MessageTextInput, Output
from langflow.schema.message import Message


class ArtificialDelay(Component):
    display_name = "Artificial Delay"
    description = "Sleeps for 0.5 seconds and echoes its input with a unique stamp."

    inputs = [MessageTextInput(name="input_value", display_name="Input")]
    outputs = [Output(display_name="Output", name="output", method="delayed_echo")]

    def delayed_echo(self) -> Message:
        time.sleep(0.5)
        return Message(text=f"{self.input_value} [{time.time_ns()}]")
"#;

/// Creates a new benchmark flow and returns its identifier.
///
/// A new flow is created on every call. Existing flows are never looked up or updated.
pub async fn create_fixture(session: &Session, name_prefix: &str) -> ProvisionResult<String> {
    let flow = build_fixture(&fixture_name(name_prefix, SystemTime::now()));

    let created = session
        .create_flow(&flow)
        .await
        .map_err(|err| match err {
            flowbench_client::Error::MissingField { .. } => ProvisionError::MissingFixtureId,
            err => ProvisionError::CreateFixture(err),
        })?;

    tracing::info!(flow_id = %created.id, name = %flow.name, "created benchmark flow");
    Ok(created.id)
}

/// Returns a unique flow name.
///
/// The name carries the Unix time in seconds and a random suffix, which keeps names of runs
/// started within the same second apart.
pub fn fixture_name(prefix: &str, now: SystemTime) -> String {
    let seconds = now
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default();
    let suffix = uuid::Uuid::new_v4().simple().to_string();

    format!("{prefix} {seconds}-{}", &suffix[..8])
}

/// Builds the flow payload for the given name.
pub fn build_fixture(name: &str) -> NewFlow {
    let input = component(
        INPUT_NODE,
        "ChatInput",
        "Chat Input",
        0.0,
        [("input_value", "str", "")],
    );
    let delay = component(
        DELAY_NODE,
        "ArtificialDelay",
        "Artificial Delay",
        400.0,
        [("code", "code", DELAY_COMPONENT)],
    );
    let output = component(OUTPUT_NODE, "ChatOutput", "Chat Output", 800.0, []);

    NewFlow {
        name: name.to_owned(),
        description: Some(DESCRIPTION.to_owned()),
        data: FlowData {
            nodes: vec![input, delay, output],
            edges: vec![
                Edge::between(INPUT_NODE, DELAY_NODE),
                Edge::between(DELAY_NODE, OUTPUT_NODE),
            ],
        },
    }
}

fn component<const N: usize>(
    id: &str,
    component: &str,
    display_name: &str,
    x: f64,
    template: [(&str, &str, &str); N],
) -> Node {
    let template: BTreeMap<_, _> = template
        .into_iter()
        .map(|(field, kind, value)| {
            let field_value = TemplateField {
                kind: kind.to_owned(),
                value: value.to_owned(),
            };
            (field.to_owned(), field_value)
        })
        .collect();

    Node {
        id: id.to_owned(),
        kind: GENERIC_NODE.to_owned(),
        position: Position { x, y: 0.0 },
        data: NodeData {
            id: id.to_owned(),
            component: component.to_owned(),
            node: ComponentNode {
                display_name: display_name.to_owned(),
                template,
            },
        },
    }
}

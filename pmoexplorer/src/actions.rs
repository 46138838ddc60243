//! Action, argument and state variable resolution over a service description (SCPD).
//!
//! Every lookup is a query on the description tree: an action is the parent of a
//! `name` element under `action`, its arguments are `name` elements under
//! `argument`, and each argument points to a state variable through its
//! `relatedStateVariable` child.

use std::str::FromStr;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::description::ServiceDescriptor;
use crate::errors::{ExplorerError, LookupKind, Result};
use crate::inference::{ArgValue, infer_default};
use crate::soap::SoapRequest;
use crate::xml::{Query, XmlDocument, XmlElement};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::In => "in",
            Direction::Out => "out",
        }
    }
}

impl FromStr for Direction {
    type Err = ExplorerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "in" => Ok(Direction::In),
            "out" => Ok(Direction::Out),
            other => Err(ExplorerError::malformed(format!(
                "unknown argument direction '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentDescriptor {
    pub name: String,
    /// `None` when the argument declares no `direction`.
    pub direction: Option<Direction>,
    pub related_state_variable: Option<String>,
}

/// Descriptive children of a `stateVariable` element, in document order.
///
/// List and range children are flattened to their descendants' text joined with
/// `", "`; every other child keeps its own text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateVariableDescriptor {
    name: String,
    entries: Vec<(String, String)>,
}

impl StateVariableDescriptor {
    pub fn new(name: impl Into<String>, entries: Vec<(String, String)>) -> Self {
        Self {
            name: name.into(),
            entries,
        }
    }

    fn from_element(name: &str, element: XmlElement<'_>) -> Self {
        let entries = element
            .children()
            .filter(|child| !child.tag().eq_ignore_ascii_case("name"))
            .map(|child| {
                let tag = child.tag().to_string();
                let lower = tag.to_lowercase();
                let text = if lower.contains("list") || lower.contains("range") {
                    child
                        .find(&Query::new())
                        .into_iter()
                        .filter_map(|item| item.text_opt())
                        .collect::<Vec<_>>()
                        .join(", ")
                } else {
                    child.text().to_string()
                };
                (tag, text)
            })
            .collect();
        Self::new(name, entries)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Text of the first entry whose tag equals `tag`, ignoring case.
    pub fn get(&self, tag: &str) -> Option<&str> {
        self.entries()
            .find(|(k, _)| k.eq_ignore_ascii_case(tag))
            .map(|(_, v)| v)
    }

    pub fn datatype(&self) -> Option<&str> {
        self.get("dataType")
    }

    pub fn default_value(&self) -> Option<&str> {
        self.get("defaultValue")
    }

    pub fn allowed_values(&self) -> Option<&str> {
        self.get("allowedValueList")
    }

    pub fn allowed_range(&self) -> Option<&str> {
        self.get("allowedValueRange")
    }
}

/// One action of a service, with its arguments split by direction.
///
/// Arguments without a declared direction appear in neither list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionSignature {
    pub name: String,
    pub inputs: Vec<ArgumentDescriptor>,
    pub outputs: Vec<ArgumentDescriptor>,
}

/// Input arguments of one action with their inferred values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionContext {
    pub action_name: String,
    pub input_args: IndexMap<String, Option<ArgValue>>,
}

impl ActionContext {
    /// Names of the inputs no value could be inferred for.
    pub fn unresolved(&self) -> Vec<&str> {
        self.input_args
            .iter()
            .filter(|(_, value)| value.is_none())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Builds the SOAP request, `overrides` taking precedence over inferred values.
    ///
    /// Overrides naming arguments the action does not declare are ignored.
    pub fn into_request<I, K, V>(self, service: &ServiceDescriptor, overrides: I) -> Result<SoapRequest>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ArgValue>,
    {
        let mut input_args = self.input_args;
        for (name, value) in overrides {
            let name = name.into();
            match input_args.get_mut(&name) {
                Some(slot) => *slot = Some(value.into()),
                None => warn!(
                    action = self.action_name.as_str(),
                    "Ignoring override for undeclared argument {}", name
                ),
            }
        }

        let mut resolved = IndexMap::with_capacity(input_args.len());
        for (name, value) in input_args {
            match value {
                Some(value) => {
                    resolved.insert(name, value);
                }
                None => return Err(ExplorerError::UnresolvedArgument(name)),
            }
        }

        Ok(SoapRequest {
            control_url: service.control_url.clone(),
            service_type: service.service_type.clone(),
            action_name: self.action_name,
            input_args: resolved,
        })
    }
}

fn find_action<'a>(doc: &'a XmlDocument, action_name: &str) -> Result<XmlElement<'a>> {
    doc.root()
        .find_first(
            &Query::new()
                .tag("name")
                .parent("action")
                .text(action_name)
                .exact(),
        )
        .and_then(XmlElement::parent)
        .ok_or_else(|| ExplorerError::not_found(LookupKind::Action, action_name))
}

fn find_argument<'a>(
    action: XmlElement<'a>,
    action_name: &str,
    arg_name: &str,
) -> Result<XmlElement<'a>> {
    action
        .find_first(&Query::new().tag("name").parent("argument").text(arg_name).exact())
        .and_then(XmlElement::parent)
        .ok_or_else(|| {
            ExplorerError::not_found(LookupKind::Argument, &format!("{}.{}", action_name, arg_name))
        })
}

fn argument_descriptors(action: XmlElement<'_>) -> Result<Vec<ArgumentDescriptor>> {
    action
        .find(&Query::new().tag("name").parent("argument").exact())
        .into_iter()
        .map(|name| -> Result<ArgumentDescriptor> {
            let argument = name.parent();
            let direction = argument
                .and_then(|a| a.child("direction"))
                .and_then(|d| d.text_opt())
                .map(str::parse::<Direction>)
                .transpose()?;
            Ok(ArgumentDescriptor {
                name: name.text().to_string(),
                direction,
                related_state_variable: argument
                    .and_then(|a| a.child("relatedStateVariable"))
                    .and_then(|v| v.text_opt())
                    .map(str::to_string),
            })
        })
        .collect()
}

/// Arguments of `action_name` in document order, optionally restricted to one direction.
pub fn action_arguments(
    doc: &XmlDocument,
    action_name: &str,
    direction: Option<Direction>,
) -> Result<Vec<ArgumentDescriptor>> {
    let action = find_action(doc, action_name)?;
    let mut arguments = argument_descriptors(action)?;
    if let Some(direction) = direction {
        arguments.retain(|arg| arg.direction == Some(direction));
    }
    debug!(
        action = action_name,
        "Found {} argument(s) for direction {:?}",
        arguments.len(),
        direction
    );
    Ok(arguments)
}

/// Name of the state variable `arg_name` of `action_name` is bound to.
pub fn related_state_variable(doc: &XmlDocument, action_name: &str, arg_name: &str) -> Result<String> {
    let action = find_action(doc, action_name)?;
    let argument = find_argument(action, action_name, arg_name)?;
    argument
        .child("relatedStateVariable")
        .and_then(|v| v.text_opt())
        .map(str::to_string)
        .ok_or_else(|| {
            ExplorerError::not_found(
                LookupKind::RelatedStateVariable,
                &format!("{}.{}", action_name, arg_name),
            )
        })
}

/// Metadata of the state variable bound to `arg_name` of `action_name`.
pub fn state_variable_descriptor(
    doc: &XmlDocument,
    action_name: &str,
    arg_name: &str,
) -> Result<StateVariableDescriptor> {
    let variable = related_state_variable(doc, action_name, arg_name)?;
    state_variable(doc, &variable)
}

/// Metadata of the state variable called exactly `variable`.
pub fn state_variable(doc: &XmlDocument, variable: &str) -> Result<StateVariableDescriptor> {
    let element = doc
        .root()
        .find_first(
            &Query::new()
                .tag("name")
                .parent("statevariable")
                .text(variable)
                .exact(),
        )
        .and_then(XmlElement::parent)
        .ok_or_else(|| ExplorerError::not_found(LookupKind::StateVariable, variable))?;
    Ok(StateVariableDescriptor::from_element(variable, element))
}

/// Every argument of `action_name`, inputs first, paired with its state variable.
pub fn describe_action(
    doc: &XmlDocument,
    action_name: &str,
) -> Result<Vec<(ArgumentDescriptor, StateVariableDescriptor)>> {
    let mut described = Vec::new();
    for direction in [Direction::In, Direction::Out] {
        for argument in action_arguments(doc, action_name, Some(direction))? {
            let descriptor = state_variable_descriptor(doc, action_name, &argument.name)?;
            described.push((argument, descriptor));
        }
    }
    Ok(described)
}

/// Every action declared by the service, in document order.
pub fn list_actions(doc: &XmlDocument) -> Result<Vec<ActionSignature>> {
    doc.root()
        .find(&Query::new().tag("name").parent("action").exact())
        .into_iter()
        .filter_map(|name| name.parent().map(|action| (name.text(), action)))
        .map(|(name, action)| -> Result<ActionSignature> {
            let (inputs, outputs): (Vec<_>, Vec<_>) = argument_descriptors(action)?
                .into_iter()
                .filter(|arg| arg.direction.is_some())
                .partition(|arg| arg.direction == Some(Direction::In));
            Ok(ActionSignature {
                name: name.to_string(),
                inputs,
                outputs,
            })
        })
        .collect()
}

/// Resolves the inputs of `action_name` and infers a value for each of them.
///
/// Fails with `NotFound` when the action, an input argument or its state
/// variable cannot be resolved.
pub fn prepare_action(doc: &XmlDocument, action_name: &str) -> Result<ActionContext> {
    let mut input_args = IndexMap::new();
    for argument in action_arguments(doc, action_name, Some(Direction::In))? {
        let descriptor = state_variable_descriptor(doc, action_name, &argument.name)?;
        let value = infer_default(&descriptor);
        debug!(
            action = action_name,
            argument = argument.name.as_str(),
            "Inferred value {:?}",
            value
        );
        input_args.insert(argument.name, value);
    }

    Ok(ActionContext {
        action_name: action_name.to_string(),
        input_args,
    })
}

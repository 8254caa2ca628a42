//! Authentication flows module.
//!
//! Custom top-level flows become `keycloak_authentication_flow`; their
//! executions are expanded recursively into executions and sub-flows, in
//! priority order, chained with `depends_on` so the provider creates them
//! in the same order. Built-in flows already exist in every realm and are
//! only listed in a comment.
//!
//! A sub-flow alias is declared at most once. Keycloak flow aliases are
//! unique per realm, so a second reference to the same sub-flow, or a
//! reference to a top-level flow, becomes a comment instead of a copy.

use std::collections::{BTreeMap, BTreeSet};

use hcl::structure::BlockBuilder;

use super::{id_ref, map_output, preamble, EmitContext};
use crate::document::{reference, references, resource, var, BlockBuilderExt, Document};
use crate::error::ForgeResult;
use crate::model::{AuthenticationExecution, AuthenticationFlow};
use crate::naming::LabelAllocator;

const FLOW: &str = "keycloak_authentication_flow";
const SUBFLOW: &str = "keycloak_authentication_subflow";
const EXECUTION: &str = "keycloak_authentication_execution";

struct FlowWalker<'f> {
    doc: Document,
    labels: LabelAllocator,
    flows: BTreeMap<String, &'f AuthenticationFlow>,
    /// Sub-flow aliases already declared, with the declaring resource address.
    expanded: BTreeMap<String, String>,
}

/// Emits custom authentication flows with their executions.
pub fn emit(ctx: &mut EmitContext<'_>) -> ForgeResult<String> {
    let mut doc = Document::new();
    preamble(&mut doc, ctx, "Module: auth_flows");

    let mut parsed = Vec::new();
    for (index, flow) in ctx.section::<AuthenticationFlow>("authenticationFlows") {
        let subject = format!("authenticationFlows[{index}]");
        if let Some(alias) = ctx.identifier(&subject, "alias", flow.alias.as_deref(), "flow", index) {
            parsed.push((index, alias, flow));
        }
    }

    let built_in: Vec<&str> = parsed
        .iter()
        .filter(|(_, _, f)| f.built_in())
        .map(|(_, alias, _)| alias.as_str())
        .collect();
    if !built_in.is_empty() {
        doc.blank();
        doc.comment(&format!(
            "Built-in flows are managed by Keycloak and not recreated: {}",
            built_in.join(", ")
        ));
    }

    let mut flows = BTreeMap::new();
    for (_, alias, flow) in &parsed {
        flows.entry(alias.clone()).or_insert(flow);
    }
    let mut walker = FlowWalker {
        doc,
        labels: LabelAllocator::new(),
        flows,
        expanded: BTreeMap::new(),
    };

    let mut ids = BTreeMap::new();
    for (index, alias, flow) in &parsed {
        if flow.built_in() || !flow.top_level() || ids.contains_key(alias) {
            continue;
        }
        let label = walker.labels.claim(alias);
        walker.doc.blank();
        walker.doc.block(
            resource(FLOW, &label)
                .add_attribute(("realm_id", var("realm_id")))
                .add_attribute(("alias", alias.as_str()))
                .opt_attribute("description", flow.description.as_deref())
                .add_attribute(("provider_id", flow.provider_id()))
                .build(),
        );
        let mut visited = BTreeSet::from([alias.clone()]);
        walker.executions(
            ctx,
            &format!("authenticationFlows[{index}]"),
            flow,
            &format!("{FLOW}.{label}.alias"),
            &label,
            &mut visited,
        );
        ids.insert(alias.clone(), id_ref(FLOW, &label));
    }

    let FlowWalker { mut doc, .. } = walker;
    map_output(&mut doc, "flow_ids", "Authentication flow IDs keyed by alias", &ids);
    doc.render()
}

impl FlowWalker<'_> {
    fn executions(
        &mut self,
        ctx: &mut EmitContext<'_>,
        subject: &str,
        flow: &AuthenticationFlow,
        parent_alias_expr: &str,
        parent_label: &str,
        visited: &mut BTreeSet<String>,
    ) {
        let section = format!("{subject}.authenticationExecutions");
        let raw = ctx.nested(&section, &flow.authentication_executions);
        let mut executions = ctx.entries::<AuthenticationExecution>(&section, raw);
        executions.sort_by_key(|(index, e)| (e.priority.unwrap_or(i64::MAX), *index));

        let mut previous: Option<String> = None;
        for (index, execution) in executions {
            let exec_subject = format!("{section}[{index}]");
            let address = if execution.is_subflow() {
                let Some(sub_alias) = execution.flow_alias.as_deref() else {
                    ctx.skip(&exec_subject, "sub-flow execution without `flowAlias`");
                    continue;
                };
                if visited.contains(sub_alias) {
                    ctx.malformed(&exec_subject, format!("flow `{sub_alias}` includes itself"));
                    continue;
                }
                let sub_flow = self.flows.get(sub_alias).copied();
                if sub_flow.is_some_and(AuthenticationFlow::top_level) {
                    self.doc.blank();
                    self.doc.comment(&format!(
                        "Top-level flow \"{sub_alias}\" is referenced as a sub-flow of {parent_label}; add the execution manually."
                    ));
                    ctx.unresolved(&exec_subject, format!("top-level flow `{sub_alias}` cannot be nested"));
                    continue;
                }
                if let Some(declared) = self.expanded.get(sub_alias) {
                    self.doc.blank();
                    self.doc.comment(&format!(
                        "Sub-flow \"{sub_alias}\" is already declared as {declared}; it is shared with {parent_label}."
                    ));
                    ctx.unresolved(
                        &exec_subject,
                        format!("sub-flow `{sub_alias}` is already declared as {declared}"),
                    );
                    continue;
                }
                if sub_flow.is_none() {
                    ctx.unresolved(&exec_subject, format!("sub-flow `{sub_alias}` is not defined in the export"));
                }
                let label = self.labels.claim(&format!("{parent_label}_{sub_alias}"));
                let address = format!("{SUBFLOW}.{label}");
                self.expanded.insert(sub_alias.to_string(), address.clone());
                let provider_id = sub_flow.map_or("basic-flow", AuthenticationFlow::provider_id);
                self.doc.blank();
                self.doc.block(
                    depends_on(
                        resource(SUBFLOW, &label)
                            .add_attribute(("realm_id", var("realm_id")))
                            .add_attribute(("parent_flow_alias", reference(parent_alias_expr)))
                            .add_attribute(("alias", sub_alias))
                            .opt_attribute("description", sub_flow.and_then(|f| f.description.as_deref()))
                            .add_attribute(("provider_id", provider_id))
                            .add_attribute(("requirement", execution.requirement())),
                        previous.as_deref(),
                    )
                    .build(),
                );
                if let Some(sub_flow) = sub_flow {
                    visited.insert(sub_alias.to_string());
                    self.executions(
                        ctx,
                        &exec_subject,
                        sub_flow,
                        &format!("{address}.alias"),
                        &label,
                        visited,
                    );
                    visited.remove(sub_alias);
                }
                address
            } else {
                let Some(authenticator) = execution.authenticator.as_deref() else {
                    ctx.skip(&exec_subject, "execution without `authenticator`");
                    continue;
                };
                let label = self.labels.claim(&format!("{parent_label}_{authenticator}"));
                self.doc.blank();
                self.doc.block(
                    depends_on(
                        resource(EXECUTION, &label)
                            .add_attribute(("realm_id", var("realm_id")))
                            .add_attribute(("parent_flow_alias", reference(parent_alias_expr)))
                            .add_attribute(("authenticator", authenticator))
                            .add_attribute(("requirement", execution.requirement())),
                        previous.as_deref(),
                    )
                    .build(),
                );
                format!("{EXECUTION}.{label}")
            };
            previous = Some(address);
        }
    }
}

fn depends_on(block: BlockBuilder, previous: Option<&str>) -> BlockBuilder {
    block.opt_attribute("depends_on", previous.map(|previous| references([previous])))
}

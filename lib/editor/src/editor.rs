//! The flow editor session.
//!
//! [`FlowEditor`] owns the live graph, its undo history and the session
//! flags, and is the boundary every user operation goes through. Each
//! operation builds the next graph in a local and swaps it in only when the
//! whole mutation succeeded, so a failed operation leaves the session as it
//! was. Failures are reported twice: as a [`Notification`] for the user and
//! as a `Report<EditorError>` for the caller.

use crate::config::EditorConfig;
use crate::document::{FlowDraft, FlowVersion, TIMESTAMP_KEYS};
use crate::edge::{DEFAULT_SOURCE_PORT, Edge};
use crate::error::{EditorError, GraphError, StoreError};
use crate::graph::FlowGraph;
use crate::history::History;
use crate::icon::icon_for;
use crate::import::{apply_import, parse_import, plan_import};
use crate::mapper::{draft_from_graph, graph_from_draft, graph_from_version, version_graph_from_graph};
use crate::node::{JsonMap, Node, NodeData, Position};
use crate::notification::Notification;
use crate::palette::{CatalogEntry, CatalogKind, DRAG_PAYLOAD_MIME, DragPayload, Palette};
use crate::placement::{self, PendingConnection, Viewport};
use crate::shortcut::{self, HistoryCommand, KeyPress};
use crate::store::FlowStore;
use crate::version::{build_version, next_version, sort_versions, version_number};
use chrono::Utc;
use flowdesk_core::{EdgeId, FlowId, NodeId, Result};
use rootcause::prelude::Report;
use serde_json::Value;
use tracing::instrument;

/// Metadata applied to the document on an explicit save.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowMetadata {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
}

/// An editing session over one flow.
pub struct FlowEditor<S> {
    store: S,
    config: EditorConfig,
    /// The document as last loaded or saved.
    flow: FlowDraft,
    graph: FlowGraph,
    history: History<FlowGraph>,
    viewport: Viewport,
    pending: PendingConnection,
    versions: Vec<FlowVersion>,
    notifications: Vec<Notification>,
    dirty: bool,
    saving: bool,
}

impl<S: FlowStore> FlowEditor<S> {
    /// Creates a session for a new, unsaved flow.
    #[must_use]
    pub fn new(store: S, config: EditorConfig, flow: FlowDraft) -> Self {
        let history = History::new(config.history.capacity);
        Self {
            store,
            config,
            flow,
            graph: FlowGraph::new(),
            history,
            viewport: Viewport::default(),
            pending: PendingConnection::None,
            versions: Vec::new(),
            notifications: Vec::new(),
            dirty: false,
            saving: false,
        }
    }

    /// Opens a session on a stored flow.
    ///
    /// # Errors
    ///
    /// Returns `LoadFailed` if the flow cannot be fetched.
    pub async fn open(store: S, config: EditorConfig, flow_id: &FlowId) -> Result<Self, EditorError> {
        let mut editor = Self::new(store, config, FlowDraft::default());
        editor.load(flow_id).await?;
        Ok(editor)
    }

    #[must_use]
    pub fn graph(&self) -> &FlowGraph {
        &self.graph
    }

    /// The document as last loaded or saved.
    #[must_use]
    pub fn flow(&self) -> &FlowDraft {
        &self.flow
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Pans or zooms the canvas. Not an edit.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    #[must_use]
    pub fn pending_connection(&self) -> &PendingConnection {
        &self.pending
    }

    /// Cached versions, newest first.
    #[must_use]
    pub fn versions(&self) -> &[FlowVersion] {
        &self.versions
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[must_use]
    pub fn is_saving(&self) -> bool {
        self.saving
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Removes and returns the notifications raised so far.
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Returns a warning when leaving now would lose changes.
    #[must_use]
    pub fn exit_guard(&self) -> Option<Notification> {
        self.dirty
            .then(|| Notification::warning("You have unsaved changes. Leave anyway?"))
    }

    fn notify(&mut self, notification: Notification) {
        tracing::debug!(level = %notification.level, message = %notification.message, "Notification");
        self.notifications.push(notification);
    }

    fn reject<T>(&mut self, error: EditorError) -> Result<T, EditorError> {
        tracing::warn!(error = %error, "Editor operation rejected");
        let message = error.user_message();
        if error.is_validation() {
            self.notify(Notification::warning(message));
        } else {
            self.notify(Notification::error(message));
        }
        Err(error.into())
    }

    fn store_failure<T>(&mut self, report: Report<StoreError>, context: EditorError) -> Result<T, EditorError> {
        tracing::error!(error = %report, "Flow store request failed");
        self.notify(Notification::error(context.user_message()));
        Err(report.context(context))
    }

    fn ensure_idle(&self) -> Result<(), EditorError> {
        if self.saving {
            tracing::debug!("Edit rejected while saving");
            return Err(EditorError::Busy.into());
        }
        Ok(())
    }

    /// Swaps in `next`, recording the replaced graph.
    fn commit(&mut self, next: FlowGraph) {
        let previous = std::mem::replace(&mut self.graph, next);
        self.history.snapshot(previous);
        self.dirty = true;
    }

    /// Applies a fallible edit to a copy of the graph and commits it.
    fn edit<T>(
        &mut self,
        apply: impl FnOnce(&mut FlowGraph) -> std::result::Result<T, GraphError>,
    ) -> Result<T, EditorError> {
        self.ensure_idle()?;
        let mut next = self.graph.clone();
        let value = match apply(&mut next) {
            Ok(value) => value,
            Err(error) => return self.reject(error.into()),
        };
        self.commit(next);
        Ok(value)
    }

    /// Commits `next`, or reports the graph error that prevented building it.
    fn commit_built(&mut self, next: std::result::Result<FlowGraph, GraphError>) -> Result<(), EditorError> {
        match next {
            Ok(graph) => {
                self.commit(graph);
                Ok(())
            }
            Err(error) => self.reject(error.into()),
        }
    }

    /// Adds a node.
    ///
    /// # Errors
    ///
    /// Returns `Busy` while saving, or a graph error for a duplicate id.
    pub fn add_node(&mut self, node: Node) -> Result<(), EditorError> {
        self.edit(|graph| graph.add_node(node))
    }

    /// Deletes a node and its edges.
    ///
    /// # Errors
    ///
    /// Returns `Busy` while saving, or a graph error if the node is missing.
    #[instrument(skip(self), fields(node_id = %node_id))]
    pub fn delete_node(&mut self, node_id: &NodeId) -> Result<Node, EditorError> {
        let node = self.edit(|graph| graph.delete_node(node_id))?;
        if matches!(&self.pending, PendingConnection::FromNode(id) if id == node_id) {
            self.pending = PendingConnection::None;
        }
        Ok(node)
    }

    /// Adds an edge.
    ///
    /// # Errors
    ///
    /// Returns `Busy` while saving, or a graph error if an endpoint is missing.
    pub fn add_edge(&mut self, edge: Edge) -> Result<(), EditorError> {
        self.edit(|graph| graph.add_edge(edge))
    }

    /// Connects two ports with a new edge and returns its id.
    ///
    /// # Errors
    ///
    /// Returns `Busy` while saving, or a graph error if an endpoint is missing.
    pub fn connect(
        &mut self,
        source: NodeId,
        source_port: &str,
        target: NodeId,
        target_port: &str,
    ) -> Result<EdgeId, EditorError> {
        let edge = Edge::with_ports(EdgeId::generate(), source, source_port, target, target_port);
        let edge_id = edge.id.clone();
        self.add_edge(edge)?;
        Ok(edge_id)
    }

    /// Deletes an edge.
    ///
    /// # Errors
    ///
    /// Returns `Busy` while saving, or a graph error if the edge is missing.
    pub fn delete_edge(&mut self, edge_id: &EdgeId) -> Result<Edge, EditorError> {
        self.edit(|graph| graph.delete_edge(edge_id))
    }

    /// Merges a configuration patch into a node.
    ///
    /// # Errors
    ///
    /// Returns `Busy` while saving, or a graph error if the node is missing.
    pub fn update_node_data(&mut self, node_id: &NodeId, patch: &JsonMap) -> Result<(), EditorError> {
        self.edit(|graph| graph.update_node_data(node_id, patch))
    }

    /// Moves a node in one step, outside of a drag.
    ///
    /// # Errors
    ///
    /// Returns `Busy` while saving, or a graph error for a missing node or
    /// non-finite position.
    pub fn move_node(&mut self, node_id: &NodeId, position: Position) -> Result<(), EditorError> {
        self.edit(|graph| graph.move_node(node_id, position))
    }

    /// Starts a drag, holding the current graph as its undo point.
    ///
    /// # Errors
    ///
    /// Returns `Busy` while saving.
    pub fn begin_drag(&mut self) -> Result<(), EditorError> {
        self.ensure_idle()?;
        self.history.begin_drag(self.graph.clone());
        Ok(())
    }

    /// Moves a node during a drag without touching history.
    ///
    /// # Errors
    ///
    /// Returns `Busy` while saving, or a graph error for a missing node or
    /// non-finite position.
    pub fn drag_to(&mut self, node_id: &NodeId, position: Position) -> Result<(), EditorError> {
        self.ensure_idle()?;
        self.graph
            .move_node(node_id, position)
            .map_err(EditorError::from)?;
        self.dirty = true;
        Ok(())
    }

    /// Ends a drag, recording the pre-drag graph once.
    pub fn end_drag(&mut self) {
        if self.history.end_drag() {
            tracing::trace!(depth = self.history.undo_depth(), "Drag committed to history");
        }
    }

    /// Selects one node.
    ///
    /// # Errors
    ///
    /// Returns `Busy` while saving, or a graph error if the node is missing.
    pub fn select_node(&mut self, node_id: &NodeId) -> Result<(), EditorError> {
        self.ensure_idle()?;
        self.graph.select_only(node_id).map_err(EditorError::from)?;
        Ok(())
    }

    /// Clears the selection.
    ///
    /// # Errors
    ///
    /// Returns `Busy` while saving.
    pub fn clear_selection(&mut self) -> Result<(), EditorError> {
        self.ensure_idle()?;
        self.graph.clear_selection();
        Ok(())
    }

    /// Nodes showing the "add next step" affordance.
    #[must_use]
    pub fn add_affordances(&self) -> Vec<NodeId> {
        self.graph.nodes_without_outgoing(DEFAULT_SOURCE_PORT)
    }

    /// Arms auto-connect from a node's "add" affordance.
    ///
    /// # Errors
    ///
    /// Returns a graph error if the node is missing.
    pub fn request_auto_connect(&mut self, node_id: &NodeId) -> Result<(), EditorError> {
        if !self.graph.contains_node(node_id) {
            return Err(EditorError::from(GraphError::NodeNotFound {
                node_id: node_id.clone(),
            })
            .into());
        }
        self.pending = PendingConnection::FromNode(node_id.clone());
        Ok(())
    }

    /// Arms insertion into the middle of an edge.
    ///
    /// # Errors
    ///
    /// Returns a graph error if the edge is missing.
    pub fn request_edge_split(&mut self, edge_id: &EdgeId) -> Result<(), EditorError> {
        if self.graph.edge(edge_id).is_none() {
            return Err(EditorError::from(GraphError::EdgeNotFound {
                edge_id: edge_id.clone(),
            })
            .into());
        }
        self.pending = PendingConnection::SplitEdge(edge_id.clone());
        Ok(())
    }

    /// Disarms a pending connection, e.g. when the palette closes.
    pub fn cancel_pending_connection(&mut self) {
        self.pending = PendingConnection::None;
    }

    /// Which catalog the palette should offer.
    #[must_use]
    pub fn palette_kind(&self) -> CatalogKind {
        CatalogKind::for_graph(self.graph.is_empty())
    }

    /// Groups catalog entries for the palette.
    #[must_use]
    pub fn palette(&self, entries: impl IntoIterator<Item = CatalogEntry>) -> Palette {
        Palette::build(self.palette_kind(), entries)
    }

    /// Handles a drop whose data transfer carries `raw` under `mime`.
    ///
    /// Drops of anything but a [`DRAG_PAYLOAD_MIME`] payload are ignored and
    /// return `None`.
    ///
    /// # Errors
    ///
    /// Same as [`FlowEditor::drop_operator`].
    pub fn drop_transfer(&mut self, mime: &str, raw: &str, pointer: Position) -> Result<Option<NodeId>, EditorError> {
        if mime != DRAG_PAYLOAD_MIME {
            tracing::trace!(mime, "Ignoring foreign drop");
            return Ok(None);
        }
        self.drop_operator(raw, pointer).map(Some)
    }

    /// Handles a palette drop carrying a serialized payload.
    ///
    /// `pointer` is in screen space.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPayload` for a malformed payload, `Busy` while saving.
    pub fn drop_operator(&mut self, raw: &str, pointer: Position) -> Result<NodeId, EditorError> {
        let payload = match DragPayload::decode(raw) {
            Ok(payload) => payload,
            Err(report) => {
                tracing::warn!(error = %report, "Invalid node operator payload");
                self.notify(Notification::warning("Invalid node operator payload"));
                return Err(report);
            }
        };
        self.insert_operator(payload, pointer)
    }

    /// Inserts an operator at the position the pending connection dictates.
    ///
    /// # Errors
    ///
    /// Returns `Busy` while saving.
    #[instrument(skip(self, payload), fields(slug = ?payload.slug))]
    pub fn insert_operator(&mut self, payload: DragPayload, pointer: Position) -> Result<NodeId, EditorError> {
        self.ensure_idle()?;
        let placement = placement::resolve(
            &self.graph,
            &self.pending,
            pointer,
            &self.viewport,
            &self.config.placement,
        );

        let category = payload.category.clone().unwrap_or_default();
        let mut data = NodeData::new(
            payload.label.unwrap_or_default(),
            payload.slug.unwrap_or_default(),
        );
        data.description = payload.description;
        data.config
            .insert("subtitle".to_string(), Value::String(category.clone()));
        if let Some(operator_id) = payload.operator_id {
            data.config
                .insert("operatorId".to_string(), Value::String(operator_id));
        }
        data.config.insert(
            "iconColor".to_string(),
            Value::String(self.config.placement.icon_color.clone()),
        );
        data.icon = icon_for(&category);

        let node_id = NodeId::generate();
        let node = Node::new(node_id.clone(), placement.position, data);
        self.commit_built(placement::insert(&self.graph, node, &placement))?;
        self.pending = PendingConnection::None;
        tracing::debug!(node_id = %node_id, wiring = ?placement.wiring, "Inserted operator");
        Ok(node_id)
    }

    /// Undoes the last edit. Returns false when there was nothing to undo.
    ///
    /// # Errors
    ///
    /// Returns `Busy` while saving.
    pub fn undo(&mut self) -> Result<bool, EditorError> {
        self.ensure_idle()?;
        match self.history.undo(self.graph.clone()) {
            Some(previous) => {
                self.graph = previous;
                self.dirty = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Redoes the last undone edit. Returns false when there was nothing to redo.
    ///
    /// # Errors
    ///
    /// Returns `Busy` while saving.
    pub fn redo(&mut self) -> Result<bool, EditorError> {
        self.ensure_idle()?;
        match self.history.redo(self.graph.clone()) {
            Some(next) => {
                self.graph = next;
                self.dirty = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Runs the undo/redo shortcut bound to `press`, if any.
    ///
    /// # Errors
    ///
    /// Returns `Busy` while saving.
    pub fn handle_key(&mut self, press: &KeyPress) -> Result<Option<HistoryCommand>, EditorError> {
        let Some(command) = shortcut::resolve(press) else {
            return Ok(None);
        };
        match command {
            HistoryCommand::Undo => self.undo()?,
            HistoryCommand::Redo => self.redo()?,
        };
        Ok(Some(command))
    }

    /// Replaces the session with a stored flow.
    ///
    /// History is cleared and the session starts clean.
    ///
    /// # Errors
    ///
    /// Returns `LoadFailed` if the flow cannot be fetched; the session is unchanged.
    #[instrument(skip(self), fields(flow_id = %flow_id))]
    pub async fn load(&mut self, flow_id: &FlowId) -> Result<(), EditorError> {
        let flow = match self.store.fetch_flow(flow_id).await {
            Ok(flow) => flow,
            Err(report) => {
                return self.store_failure(
                    report,
                    EditorError::LoadFailed {
                        flow_id: flow_id.clone(),
                    },
                );
            }
        };

        let restored = graph_from_draft(&flow);
        if restored.skipped_nodes > 0 {
            tracing::warn!(skipped = restored.skipped_nodes, "Some draft nodes could not be read");
        }
        tracing::info!(
            nodes = restored.graph.node_count(),
            edges = restored.graph.edge_count(),
            "Loaded flow"
        );

        self.graph = restored.graph;
        if let Some(viewport) = restored.viewport {
            self.viewport = viewport;
        }
        self.flow = flow;
        self.history.clear();
        self.pending = PendingConnection::None;
        self.versions.clear();
        self.dirty = false;

        if let Err(report) = self.refresh_versions().await {
            tracing::warn!(error = %report, "Version list unavailable after load");
        }
        Ok(())
    }

    /// Marks a save as in flight and returns the document to send.
    ///
    /// Edits are rejected until [`FlowEditor::finish_save`].
    ///
    /// # Errors
    ///
    /// Returns `Busy` if a save is already in flight.
    pub fn begin_save(&mut self) -> Result<FlowDraft, EditorError> {
        self.begin_save_with(&FlowMetadata::default())
    }

    /// Like [`FlowEditor::begin_save`], applying `metadata` to the document.
    ///
    /// # Errors
    ///
    /// Returns `Busy` if a save is already in flight.
    pub fn begin_save_with(&mut self, metadata: &FlowMetadata) -> Result<FlowDraft, EditorError> {
        self.ensure_idle()?;
        let mut draft = draft_from_graph(
            &self.graph,
            &self.viewport,
            &self.flow,
            &self.config.persistence,
        );
        if let Some(name) = &metadata.name {
            draft.name.clone_from(name);
        }
        if let Some(slug) = &metadata.slug {
            draft.slug.clone_from(slug);
        }
        if let Some(description) = &metadata.description {
            draft.description = Some(description.clone());
        }
        self.saving = true;
        Ok(draft)
    }

    /// Completes a save started with [`FlowEditor::begin_save`].
    ///
    /// # Errors
    ///
    /// Returns `SaveFailed` when the store call failed; the session stays dirty.
    pub fn finish_save(
        &mut self,
        result: std::result::Result<FlowDraft, Report<StoreError>>,
    ) -> Result<(), EditorError> {
        self.saving = false;
        match result {
            Ok(saved) => {
                tracing::info!(flow_id = ?saved.id, "Flow saved");
                self.flow = saved;
                self.dirty = false;
                self.notify(Notification::success("Flow saved successfully"));
                Ok(())
            }
            Err(report) => self.store_failure(report, EditorError::SaveFailed),
        }
    }

    /// Saves the live graph.
    ///
    /// # Errors
    ///
    /// Returns `Busy` if a save is in flight, `SaveFailed` if the store fails.
    pub async fn save(&mut self) -> Result<(), EditorError> {
        self.save_with(&FlowMetadata::default()).await
    }

    /// Saves the live graph with updated metadata.
    ///
    /// # Errors
    ///
    /// Returns `Busy` if a save is in flight, `SaveFailed` if the store fails.
    #[instrument(skip(self, metadata), fields(flow_id = ?self.flow.id))]
    pub async fn save_with(&mut self, metadata: &FlowMetadata) -> Result<(), EditorError> {
        let draft = self.begin_save_with(metadata)?;
        let result = self.store.save_flow(draft).await;
        self.finish_save(result)
    }

    /// Fetches the version list and caches it newest first.
    ///
    /// An unsaved flow has no versions.
    ///
    /// # Errors
    ///
    /// Returns `VersionListFailed` if the store fails; the cache is kept.
    pub async fn refresh_versions(&mut self) -> Result<&[FlowVersion], EditorError> {
        let Some(flow_id) = self.flow.id.clone() else {
            self.versions.clear();
            return Ok(&self.versions);
        };
        match self.store.list_versions(&flow_id).await {
            Ok(mut versions) => {
                sort_versions(&mut versions);
                self.versions = versions;
                Ok(&self.versions)
            }
            Err(report) => Err(report.context(EditorError::VersionListFailed { flow_id })),
        }
    }

    /// Publishes the live graph as the next version.
    ///
    /// Saves first when there are unsaved edits and stops if that save fails.
    ///
    /// # Errors
    ///
    /// Returns `EmptyGraph` or `UnsavedFlow` for an unpublishable flow,
    /// `Busy` while saving, and a store failure context otherwise.
    #[instrument(skip(self), fields(flow_id = ?self.flow.id))]
    pub async fn publish(&mut self) -> Result<FlowVersion, EditorError> {
        self.ensure_idle()?;
        if self.dirty {
            self.save().await?;
        }
        if self.graph.is_empty() {
            return self.reject(EditorError::EmptyGraph);
        }
        let Some(flow_id) = self.flow.id.clone() else {
            return self.reject(EditorError::UnsavedFlow);
        };

        self.saving = true;
        let published = self.publish_next(&flow_id).await;
        self.saving = false;
        let version = published?;

        let number = version_number(version.version.as_deref());
        tracing::info!(version = number, "Flow published");
        self.notify(Notification::success(format!(
            "Flow v{number} published successfully"
        )));
        if let Err(report) = self.refresh_versions().await {
            tracing::warn!(error = %report, "Version list unavailable after publish");
        }
        Ok(version)
    }

    async fn publish_next(&mut self, flow_id: &FlowId) -> Result<FlowVersion, EditorError> {
        let existing = match self.store.list_versions(flow_id).await {
            Ok(existing) => existing,
            Err(report) => {
                return self.store_failure(
                    report,
                    EditorError::VersionListFailed {
                        flow_id: flow_id.clone(),
                    },
                );
            }
        };

        let number = next_version(&existing);
        let version = build_version(
            &self.flow,
            number,
            version_graph_from_graph(&self.graph),
            &self.config.persistence.default_organization_id,
            &self.config.persistence.publish_description,
        );
        match self.store.create_version(version).await {
            Ok(created) => Ok(created),
            Err(report) => self.store_failure(report, EditorError::PublishFailed { version: number }),
        }
    }

    /// Replaces the live graph with a published version.
    ///
    /// The replaced graph can be restored with undo. The session becomes dirty.
    ///
    /// # Errors
    ///
    /// Returns `InvalidVersion` for a version without a graph, `Busy` while saving.
    pub fn restore_version(&mut self, version: &FlowVersion) -> Result<(), EditorError> {
        let document = serde_json::to_value(version).map_err(|e| EditorError::Serialization {
            details: e.to_string(),
        })?;
        self.restore_version_value(document)
    }

    /// Replaces the live graph with a raw version document, unwrapping
    /// `_value` wrappers first.
    ///
    /// # Errors
    ///
    /// Returns `InvalidVersion` for a malformed document, `Busy` while saving.
    pub fn restore_version_value(&mut self, document: Value) -> Result<(), EditorError> {
        self.ensure_idle()?;
        let version = match FlowVersion::from_value(document) {
            Ok(version) => version,
            Err(report) => {
                tracing::warn!(error = %report, "Unreadable version document");
                self.notify(Notification::error("Invalid version data"));
                return Err(report);
            }
        };
        let next = match graph_from_version(&version) {
            Ok(graph) => graph,
            Err(report) => {
                tracing::warn!(error = %report, "Version has no graph");
                self.notify(Notification::error("Invalid version data"));
                return Err(report);
            }
        };

        self.commit(next);
        self.pending = PendingConnection::None;
        let label = version.version.as_deref().unwrap_or("?");
        self.notify(Notification::success(format!("Restored version v{label}")));
        Ok(())
    }

    /// Appends the content of a flow file to the live graph.
    ///
    /// Returns the number of imported nodes.
    ///
    /// # Errors
    ///
    /// Returns `InvalidImport` for a malformed file, `Busy` while saving.
    pub fn import_file(&mut self, raw: &str) -> Result<usize, EditorError> {
        self.ensure_idle()?;
        let file = match parse_import(raw) {
            Ok(file) => file,
            Err(report) => {
                tracing::warn!(error = %report, "Rejected import file");
                self.notify(Notification::warning("Invalid flow file"));
                return Err(report);
            }
        };

        let outcome = plan_import(&self.graph, &file, &self.config.import);
        let imported = outcome.nodes.len();
        if outcome.skipped_triggers > 0 {
            tracing::debug!(skipped = outcome.skipped_triggers, "Skipped trigger nodes on import");
        }
        self.commit_built(apply_import(&self.graph, outcome))?;
        self.notify(Notification::success(format!(
            "Imported {imported} nodes from file"
        )));
        Ok(imported)
    }

    /// Serializes the last saved document, not the live graph.
    ///
    /// # Errors
    ///
    /// Returns `UnsavedFlow` if the flow was never saved.
    pub fn export(&self) -> Result<String, EditorError> {
        if self.flow.id.is_none() {
            return Err(EditorError::UnsavedFlow.into());
        }
        self.flow.to_pretty_json()
    }

    /// File name for [`FlowEditor::export`].
    #[must_use]
    pub fn export_file_name(&self) -> String {
        let slug = if self.flow.slug.is_empty() {
            "flow"
        } else {
            self.flow.slug.as_str()
        };
        format!("{slug}.json")
    }

    /// Renames the flow and persists only its metadata.
    ///
    /// # Errors
    ///
    /// Returns `SaveFailed` if the store fails; the local rename is kept.
    #[instrument(skip(self, description), fields(flow_id = ?self.flow.id))]
    pub async fn rename(&mut self, name: &str, description: Option<&str>) -> Result<(), EditorError> {
        self.flow.name = name.to_string();
        self.flow.description = description.map(str::to_string);
        if self.flow.id.is_none() {
            return Ok(());
        }

        match self.store.save_flow(self.flow.clone()).await {
            Ok(mut saved) => {
                if saved.tags.is_none() {
                    saved.tags.clone_from(&self.flow.tags);
                }
                if saved.category.is_none() {
                    saved.category.clone_from(&self.flow.category);
                }
                self.flow = saved;
                self.notify(Notification::success("Flow updated successfully"));
                Ok(())
            }
            Err(report) => self.store_failure(report, EditorError::SaveFailed),
        }
    }

    /// Stores a copy of the flow as a new flow and returns it.
    ///
    /// The copy is built from the last saved document.
    ///
    /// # Errors
    ///
    /// Returns `SaveFailed` if the store fails.
    pub async fn duplicate(&mut self) -> Result<FlowDraft, EditorError> {
        let mut copy = self.flow.clone();
        let base_slug = if copy.slug.is_empty() { "flow" } else { copy.slug.as_str() };
        let slug = format!("{base_slug}-copy-{}", Utc::now().timestamp_millis());
        copy.id = None;
        copy.name = format!("{} (Copy)", copy.name);
        copy.slug = slug;
        for key in TIMESTAMP_KEYS {
            copy.extra.remove(key);
        }

        match self.store.save_flow(copy).await {
            Ok(saved) => {
                tracing::info!(flow_id = ?saved.id, "Flow duplicated");
                self.notify(Notification::success("Flow duplicated successfully"));
                Ok(saved)
            }
            Err(report) => self.store_failure(report, EditorError::SaveFailed),
        }
    }
}

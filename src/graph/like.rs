use super::Graph;
use crate::error::GraphError;
use crate::spec::{ExposedPinSpec, ExposedPinsSpec, Io, MergeSpec, MergesSpec, SubPinSpec, Unit};
use serde_json::Value;
use tracing::trace;

/// The capabilities the move engine needs from each side of a move.
///
/// Mutators never cascade: removing a unit leaves merges and plugs that
/// mention it untouched, and removing a merge pin never drops the merge.
/// The engine rewires and prunes explicitly.
pub trait GraphLike {
    fn has_unit(&self, unit_id: &str) -> bool;
    fn has_merge(&self, merge_id: &str) -> bool;
    fn has_pin_named(&self, io: Io, pin_id: &str) -> bool;
    fn has_plug(&self, io: Io, pin_id: &str, sub_pin_id: &str) -> bool;
    fn has_merge_pin(&self, merge_id: &str, unit_id: &str, io: Io, pin_id: &str) -> bool;

    fn add_unit(&mut self, unit_id: &str, unit: Unit) -> Result<(), GraphError>;
    fn remove_unit(&mut self, unit_id: &str) -> Result<Unit, GraphError>;
    fn add_merge(&mut self, merge_id: &str, merge: MergeSpec) -> Result<(), GraphError>;
    fn remove_merge(&mut self, merge_id: &str) -> Result<MergeSpec, GraphError>;
    fn add_pin_to_merge(
        &mut self,
        merge_id: &str,
        unit_id: &str,
        io: Io,
        pin_id: &str,
    ) -> Result<(), GraphError>;
    fn remove_pin_from_merge(
        &mut self,
        merge_id: &str,
        unit_id: &str,
        io: Io,
        pin_id: &str,
    ) -> Result<(), GraphError>;
    /// Removes the pin, or the whole merge when it would be left with a
    /// single pin.
    fn remove_pin_or_merge(
        &mut self,
        merge_id: &str,
        unit_id: &str,
        io: Io,
        pin_id: &str,
    ) -> Result<(), GraphError>;
    fn expose_pin_set(&mut self, io: Io, pin_id: &str, spec: ExposedPinSpec)
    -> Result<(), GraphError>;
    fn expose_pin(
        &mut self,
        io: Io,
        pin_id: &str,
        sub_pin_id: &str,
        sub_pin: SubPinSpec,
    ) -> Result<(), GraphError>;
    fn cover_pin_set(&mut self, io: Io, pin_id: &str) -> Result<ExposedPinSpec, GraphError>;
    fn cover_pin(&mut self, io: Io, pin_id: &str, sub_pin_id: &str) -> Result<(), GraphError>;
    fn plug_pin(
        &mut self,
        io: Io,
        pin_id: &str,
        sub_pin_id: &str,
        sub_pin: SubPinSpec,
    ) -> Result<(), GraphError>;
    fn unplug_pin(&mut self, io: Io, pin_id: &str, sub_pin_id: &str) -> Result<(), GraphError>;
    fn set_pin_constant(&mut self, io: Io, pin_id: &str, constant: bool) -> Result<(), GraphError>;
    fn set_unit_pin_constant(
        &mut self,
        unit_id: &str,
        io: Io,
        pin_id: &str,
        constant: bool,
    ) -> Result<(), GraphError>;
    fn move_root(&mut self, parent_id: &str, child_id: &str, slot_name: &str)
    -> Result<(), GraphError>;

    fn get_unit(&self, unit_id: &str) -> Result<&Unit, GraphError>;
    fn get_merge_spec(&self, merge_id: &str) -> Result<&MergeSpec, GraphError>;
    fn get_merges_spec(&self) -> &MergesSpec;
    fn get_exposed_pin_spec(&self, io: Io, pin_id: &str) -> Result<&ExposedPinSpec, GraphError>;
    fn get_exposed_pin_specs(&self) -> &ExposedPinsSpec;
    fn get_sub_pin_spec(
        &self,
        io: Io,
        pin_id: &str,
        sub_pin_id: &str,
    ) -> Result<&SubPinSpec, GraphError>;
    fn get_pin_data(&self, io: Io, pin_id: &str) -> Option<&Value>;
    fn get_unit_pin_data(&self, unit_id: &str, io: Io, pin_id: &str) -> Option<&Value>;
    fn get_merge_data(&self, merge_id: &str) -> Option<&Value>;
    fn get_pin_plug_count(&self, io: Io, pin_id: &str) -> usize;
    fn is_pin_constant(&self, io: Io, pin_id: &str) -> bool;
    fn is_unit_pin_ref(&self, unit_id: &str, io: Io, pin_id: &str) -> bool;
}

impl GraphLike for Graph {
    fn has_unit(&self, unit_id: &str) -> bool {
        self.units.contains_key(unit_id)
    }

    fn has_merge(&self, merge_id: &str) -> bool {
        self.merges.contains_key(merge_id)
    }

    fn has_pin_named(&self, io: Io, pin_id: &str) -> bool {
        self.exposed(io).contains_key(pin_id)
    }

    fn has_plug(&self, io: Io, pin_id: &str, sub_pin_id: &str) -> bool {
        self.exposed(io)
            .get(pin_id)
            .is_some_and(|pin| pin.plug.contains_key(sub_pin_id))
    }

    fn has_merge_pin(&self, merge_id: &str, unit_id: &str, io: Io, pin_id: &str) -> bool {
        self.merges
            .get(merge_id)
            .is_some_and(|merge| merge.contains(unit_id, io, pin_id))
    }

    fn add_unit(&mut self, unit_id: &str, unit: Unit) -> Result<(), GraphError> {
        if self.units.contains_key(unit_id) {
            return Err(GraphError::DuplicateUnit(unit_id.to_string()));
        }
        trace!(unit_id, "add unit");
        self.units.insert(unit_id.to_string(), unit);
        Ok(())
    }

    fn remove_unit(&mut self, unit_id: &str) -> Result<Unit, GraphError> {
        let unit = self
            .units
            .remove(unit_id)
            .ok_or_else(|| GraphError::UnitNotFound(unit_id.to_string()))?;
        self.component.remove(unit_id);
        trace!(unit_id, "remove unit");
        Ok(unit)
    }

    fn add_merge(&mut self, merge_id: &str, merge: MergeSpec) -> Result<(), GraphError> {
        if self.merges.contains_key(merge_id) {
            return Err(GraphError::DuplicateMerge(merge_id.to_string()));
        }
        trace!(merge_id, pins = merge.pin_count(), "add merge");
        self.merges.insert(merge_id.to_string(), merge);
        Ok(())
    }

    fn remove_merge(&mut self, merge_id: &str) -> Result<MergeSpec, GraphError> {
        let merge = self
            .merges
            .remove(merge_id)
            .ok_or_else(|| GraphError::MergeNotFound(merge_id.to_string()))?;
        self.merge_data.remove(merge_id);
        trace!(merge_id, "remove merge");
        Ok(merge)
    }

    fn add_pin_to_merge(
        &mut self,
        merge_id: &str,
        unit_id: &str,
        io: Io,
        pin_id: &str,
    ) -> Result<(), GraphError> {
        self.merge_mut(merge_id)?.insert(unit_id, io, pin_id);
        Ok(())
    }

    fn remove_pin_from_merge(
        &mut self,
        merge_id: &str,
        unit_id: &str,
        io: Io,
        pin_id: &str,
    ) -> Result<(), GraphError> {
        self.merge_mut(merge_id)?.remove(unit_id, io, pin_id);
        Ok(())
    }

    fn remove_pin_or_merge(
        &mut self,
        merge_id: &str,
        unit_id: &str,
        io: Io,
        pin_id: &str,
    ) -> Result<(), GraphError> {
        if self.merge_mut(merge_id)?.pin_count() > 2 {
            self.remove_pin_from_merge(merge_id, unit_id, io, pin_id)
        } else {
            self.remove_merge(merge_id).map(|_| ())
        }
    }

    fn expose_pin_set(
        &mut self,
        io: Io,
        pin_id: &str,
        spec: ExposedPinSpec,
    ) -> Result<(), GraphError> {
        if self.has_pin_named(io, pin_id) {
            return Err(GraphError::DuplicatePin {
                io,
                pin_id: pin_id.to_string(),
            });
        }
        trace!(%io, pin_id, plugs = spec.plug_count(), "expose pin set");
        self.exposed_mut(io).insert(pin_id.to_string(), spec);
        Ok(())
    }

    fn expose_pin(
        &mut self,
        io: Io,
        pin_id: &str,
        sub_pin_id: &str,
        sub_pin: SubPinSpec,
    ) -> Result<(), GraphError> {
        self.exposed_pin_mut(io, pin_id)?
            .plug
            .insert(sub_pin_id.to_string(), sub_pin);
        Ok(())
    }

    fn cover_pin_set(&mut self, io: Io, pin_id: &str) -> Result<ExposedPinSpec, GraphError> {
        trace!(%io, pin_id, "cover pin set");
        self.exposed_mut(io)
            .remove(pin_id)
            .ok_or_else(|| GraphError::PinNotFound {
                io,
                pin_id: pin_id.to_string(),
            })
    }

    fn cover_pin(&mut self, io: Io, pin_id: &str, sub_pin_id: &str) -> Result<(), GraphError> {
        self.exposed_pin_mut(io, pin_id)?
            .plug
            .remove(sub_pin_id)
            .map(|_| ())
            .ok_or_else(|| GraphError::PlugNotFound {
                io,
                pin_id: pin_id.to_string(),
                sub_pin_id: sub_pin_id.to_string(),
            })
    }

    fn plug_pin(
        &mut self,
        io: Io,
        pin_id: &str,
        sub_pin_id: &str,
        sub_pin: SubPinSpec,
    ) -> Result<(), GraphError> {
        trace!(%io, pin_id, sub_pin_id, %sub_pin, "plug pin");
        self.exposed_pin_mut(io, pin_id)?
            .plug
            .insert(sub_pin_id.to_string(), sub_pin);
        Ok(())
    }

    fn unplug_pin(&mut self, io: Io, pin_id: &str, sub_pin_id: &str) -> Result<(), GraphError> {
        let slot = self
            .exposed_pin_mut(io, pin_id)?
            .plug
            .get_mut(sub_pin_id)
            .ok_or_else(|| GraphError::PlugNotFound {
                io,
                pin_id: pin_id.to_string(),
                sub_pin_id: sub_pin_id.to_string(),
            })?;
        *slot = SubPinSpec::unbound();
        Ok(())
    }

    fn set_pin_constant(&mut self, io: Io, pin_id: &str, constant: bool) -> Result<(), GraphError> {
        self.exposed_pin_mut(io, pin_id)?.constant = constant;
        Ok(())
    }

    fn set_unit_pin_constant(
        &mut self,
        unit_id: &str,
        io: Io,
        pin_id: &str,
        constant: bool,
    ) -> Result<(), GraphError> {
        let unit = self
            .units
            .get_mut(unit_id)
            .ok_or_else(|| GraphError::UnitNotFound(unit_id.to_string()))?;
        if unit.set_pin_constant(io, pin_id, constant) {
            Ok(())
        } else {
            Err(GraphError::UnitPinNotFound {
                unit_id: unit_id.to_string(),
                io,
                pin_id: pin_id.to_string(),
            })
        }
    }

    fn move_root(
        &mut self,
        parent_id: &str,
        child_id: &str,
        slot_name: &str,
    ) -> Result<(), GraphError> {
        for unit_id in [parent_id, child_id] {
            if !self.has_unit(unit_id) {
                return Err(GraphError::UnitNotFound(unit_id.to_string()));
            }
        }
        self.component.move_root(parent_id, child_id, slot_name);
        Ok(())
    }

    fn get_unit(&self, unit_id: &str) -> Result<&Unit, GraphError> {
        self.units
            .get(unit_id)
            .ok_or_else(|| GraphError::UnitNotFound(unit_id.to_string()))
    }

    fn get_merge_spec(&self, merge_id: &str) -> Result<&MergeSpec, GraphError> {
        self.merges
            .get(merge_id)
            .ok_or_else(|| GraphError::MergeNotFound(merge_id.to_string()))
    }

    fn get_merges_spec(&self) -> &MergesSpec {
        &self.merges
    }

    fn get_exposed_pin_spec(&self, io: Io, pin_id: &str) -> Result<&ExposedPinSpec, GraphError> {
        self.exposed(io)
            .get(pin_id)
            .ok_or_else(|| GraphError::PinNotFound {
                io,
                pin_id: pin_id.to_string(),
            })
    }

    fn get_exposed_pin_specs(&self) -> &ExposedPinsSpec {
        &self.exposed
    }

    fn get_sub_pin_spec(
        &self,
        io: Io,
        pin_id: &str,
        sub_pin_id: &str,
    ) -> Result<&SubPinSpec, GraphError> {
        self.get_exposed_pin_spec(io, pin_id)?
            .plug
            .get(sub_pin_id)
            .ok_or_else(|| GraphError::PlugNotFound {
                io,
                pin_id: pin_id.to_string(),
                sub_pin_id: sub_pin_id.to_string(),
            })
    }

    fn get_pin_data(&self, io: Io, pin_id: &str) -> Option<&Value> {
        self.exposed(io).get(pin_id)?.data.as_ref()
    }

    fn get_unit_pin_data(&self, unit_id: &str, io: Io, pin_id: &str) -> Option<&Value> {
        self.units.get(unit_id)?.pin_data(io, pin_id)
    }

    fn get_merge_data(&self, merge_id: &str) -> Option<&Value> {
        self.merge_data.get(merge_id)
    }

    fn get_pin_plug_count(&self, io: Io, pin_id: &str) -> usize {
        self.exposed(io)
            .get(pin_id)
            .map_or(0, ExposedPinSpec::plug_count)
    }

    fn is_pin_constant(&self, io: Io, pin_id: &str) -> bool {
        self.exposed(io).get(pin_id).is_some_and(|pin| pin.constant)
    }

    fn is_unit_pin_ref(&self, unit_id: &str, io: Io, pin_id: &str) -> bool {
        self.units
            .get(unit_id)
            .is_some_and(|unit| unit.is_pin_ref(io, pin_id))
    }
}

impl Graph {
    fn merge_mut(&mut self, merge_id: &str) -> Result<&mut MergeSpec, GraphError> {
        self.merges
            .get_mut(merge_id)
            .ok_or_else(|| GraphError::MergeNotFound(merge_id.to_string()))
    }

    fn exposed_pin_mut(&mut self, io: Io, pin_id: &str) -> Result<&mut ExposedPinSpec, GraphError> {
        self.exposed_mut(io)
            .get_mut(pin_id)
            .ok_or_else(|| GraphError::PinNotFound {
                io,
                pin_id: pin_id.to_string(),
            })
    }
}

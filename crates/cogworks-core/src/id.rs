use slotmap::new_key_type;

new_key_type! {
    /// Identifies a gear entity in the registry. Stable for the gear's
    /// lifetime; invalidated when the gear is despawned (removed from the
    /// board or consumed by a merge).
    pub struct GearId;
}

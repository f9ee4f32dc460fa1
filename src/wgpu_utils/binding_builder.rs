// src/wgpu_utils/binding_builder.rs
//! Builders for bind group layouts and bind groups
//!
//! Bindings are numbered in the order they are added, so a layout built with
//! three `next_binding_*` calls covers bindings 0, 1 and 2. The matching
//! [`BindGroupBuilder`] must then supply exactly three resources in the same
//! order.

/// A bind group layout together with the entries it was created from.
///
/// Keeping the entries around lets [`BindGroupBuilder`] check the resource
/// count before handing the descriptor to wgpu.
pub struct BindGroupLayoutWithDesc {
    pub layout: wgpu::BindGroupLayout,
    pub entries: Vec<wgpu::BindGroupLayoutEntry>,
}

pub struct BindGroupLayoutBuilder {
    entries: Vec<wgpu::BindGroupLayoutEntry>,
    next_binding_index: u32,
}

impl Default for BindGroupLayoutBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BindGroupLayoutBuilder {
    pub fn new() -> Self {
        BindGroupLayoutBuilder {
            entries: Vec::new(),
            next_binding_index: 0,
        }
    }

    pub fn next_binding(
        mut self,
        visibility: wgpu::ShaderStages,
        binding_type: wgpu::BindingType,
    ) -> Self {
        self.entries.push(wgpu::BindGroupLayoutEntry {
            binding: self.next_binding_index,
            visibility,
            ty: binding_type,
            count: None,
        });
        self.next_binding_index += 1;
        self
    }

    pub fn next_binding_vertex(self, binding_type: wgpu::BindingType) -> Self {
        self.next_binding(wgpu::ShaderStages::VERTEX, binding_type)
    }

    pub fn next_binding_fragment(self, binding_type: wgpu::BindingType) -> Self {
        self.next_binding(wgpu::ShaderStages::FRAGMENT, binding_type)
    }

    /// Visible to both vertex and fragment stages.
    pub fn next_binding_rendering(self, binding_type: wgpu::BindingType) -> Self {
        self.next_binding(wgpu::ShaderStages::VERTEX_FRAGMENT, binding_type)
    }

    pub fn create(self, device: &wgpu::Device, label: &str) -> BindGroupLayoutWithDesc {
        BindGroupLayoutWithDesc {
            layout: device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &self.entries,
                label: Some(label),
            }),
            entries: self.entries,
        }
    }
}

/// Collects resources for a bind group in binding order.
pub struct BindGroupBuilder<'a> {
    layout_with_desc: &'a BindGroupLayoutWithDesc,
    entries: Vec<wgpu::BindGroupEntry<'a>>,
}

impl<'a> BindGroupBuilder<'a> {
    pub fn new(layout_with_desc: &'a BindGroupLayoutWithDesc) -> Self {
        BindGroupBuilder {
            layout_with_desc,
            entries: Vec::with_capacity(layout_with_desc.entries.len()),
        }
    }

    /// Adds the resource for the next layout entry.
    ///
    /// Callers supply exactly one resource per layout entry. Debug builds
    /// assert this; in release an extra resource is numbered past the last
    /// layout binding and wgpu reports it when the group is created.
    pub fn resource(mut self, resource: wgpu::BindingResource<'a>) -> Self {
        let index = self.entries.len();
        debug_assert!(
            index < self.layout_with_desc.entries.len(),
            "more resources than the layout declares"
        );
        let binding = binding_at(&self.layout_with_desc.entries, index);
        self.entries.push(wgpu::BindGroupEntry { binding, resource });
        self
    }

    pub fn sampler(self, sampler: &'a wgpu::Sampler) -> Self {
        self.resource(wgpu::BindingResource::Sampler(sampler))
    }

    pub fn texture(self, texture_view: &'a wgpu::TextureView) -> Self {
        self.resource(wgpu::BindingResource::TextureView(texture_view))
    }

    /// Creates the bind group. A resource count that differs from the
    /// layout is a caller bug, asserted in debug builds and rejected by wgpu
    /// validation otherwise.
    pub fn create(&self, device: &wgpu::Device, label: &str) -> wgpu::BindGroup {
        debug_assert_eq!(
            self.entries.len(),
            self.layout_with_desc.entries.len(),
            "resource count does not match the layout"
        );
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &self.layout_with_desc.layout,
            entries: &self.entries,
            label: Some(label),
        })
    }
}

/// Binding number of the `index`-th layout entry, or `index` itself past the
/// end of the layout.
fn binding_at(entries: &[wgpu::BindGroupLayoutEntry], index: usize) -> u32 {
    entries.get(index).map_or(index as u32, |entry| entry.binding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wgpu_utils::binding_types;

    #[test]
    fn test_bindings_follow_insertion_order() {
        let builder = BindGroupLayoutBuilder::new()
            .next_binding_vertex(binding_types::sized_uniform(64))
            .next_binding_fragment(binding_types::texture_2d())
            .next_binding_rendering(binding_types::comparison_sampler());
        let bindings: Vec<u32> = builder.entries.iter().map(|e| e.binding).collect();
        assert_eq!(bindings, vec![0, 1, 2]);
        assert_eq!(builder.entries[2].visibility, wgpu::ShaderStages::VERTEX_FRAGMENT);

        assert_eq!(binding_at(&builder.entries, 1), 1);
    }

    #[test]
    fn test_extra_resource_is_numbered_past_the_layout() {
        let builder = BindGroupLayoutBuilder::new().next_binding_fragment(binding_types::texture_2d());
        assert_eq!(binding_at(&builder.entries, 1), 1);
        assert_eq!(binding_at(&[], 3), 3);
    }
}

use std::sync::LazyLock;

use regex::Regex;
use tree_sitter::Node;

use crate::error::{ReflectError, Result};
use crate::syntax::*;

use super::parameter::{Attribute, expect_kind};

/// `sampler`, `texture_2d<f32>`, `texture_2d <f32>`
static TEXTURE_SAMPLER_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w+) ?(?:<(\w+)>)?$").unwrap());

/// a resource declared at `@group(g) @binding(b)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub binding: u32,
    pub group: u32,
    pub name: String,
    /// `buffer`, `sampler` or the texture kind, e.g. `texture_2d`
    pub binding_type: String,
    /// the buffer's structure name, or the texture kind again
    pub ty: String,
    /// `read`, `read_write` etc. from `var<storage, read_write>`; not interpreted
    pub access_mode: Option<String>,
}

impl Binding {
    pub fn parse(tree: &SyntaxTree, node: Node<'_>) -> Result<Self> {
        expect_kind(node, GLOBAL_VARIABLE_DECLARATION)?;

        let mut binding = None;
        let mut group = None;
        let mut name = None;
        let mut binding_type = None;
        let mut ty = None;
        let mut access_mode = None;

        for child in named_children(node) {
            match child.kind() {
                ATTRIBUTE => {
                    let attribute = Attribute::parse(tree, child)?;
                    match attribute.name.as_str() {
                        "binding" => binding = Some(index_argument(&attribute)?),
                        "group" => group = Some(index_argument(&attribute)?),
                        _ => {}
                    }
                }

                VARIABLE_DECLARATION => {
                    let mut type_declaration = None;

                    for part in named_children(child) {
                        match part.kind() {
                            VARIABLE_QUALIFIER => {
                                let mut components = named_children(part).into_iter();
                                if let Some(address_space) = components.next() {
                                    let address_space = tree.text(address_space);
                                    binding_type = Some(address_space_kind(address_space)?);
                                }
                                if let Some(access) = components.next() {
                                    access_mode = Some(tree.text(access).to_string());
                                }
                            }

                            VARIABLE_IDENTIFIER_DECLARATION => {
                                name = tree.field_text(part, "name").map(str::to_string);
                                type_declaration = part.child_by_field_name("type");
                            }

                            _ => {}
                        }
                    }

                    let Some(type_declaration) = type_declaration else {
                        continue;
                    };

                    if binding_type.is_some() {
                        // buffers: the referenced structure
                        let referenced = named_children(type_declaration)
                            .into_iter()
                            .next()
                            .unwrap_or(type_declaration);
                        ty = Some(tree.text(referenced).to_string());
                    } else {
                        let kind = texture_sampler_kind(tree.text(type_declaration))?;
                        binding_type = Some(kind.clone());
                        ty = Some(kind);
                    }
                }

                _ => {}
            }
        }

        match (binding, group, name, binding_type, ty) {
            (Some(binding), Some(group), Some(name), Some(binding_type), Some(ty))
                if !name.is_empty() && !binding_type.is_empty() && !ty.is_empty() =>
            {
                Ok(Self {
                    binding,
                    group,
                    name,
                    binding_type,
                    ty,
                    access_mode,
                })
            }
            _ => Err(ReflectError::IncompleteBinding(tree.text(node).to_string())),
        }
    }
}

/// accepts suffixed literals like `1u` and `1i`
fn index_argument(attribute: &Attribute) -> Result<u32> {
    let value = attribute.value.as_str();
    value
        .strip_suffix(['u', 'i'])
        .unwrap_or(value)
        .parse()
        .map_err(|_| ReflectError::InvalidAttributeArgument {
            attribute: attribute.name.clone(),
            value: attribute.value.clone(),
        })
}

fn address_space_kind(address_space: &str) -> Result<String> {
    match address_space {
        "uniform" | "storage" => Ok("buffer".to_string()),
        other => Err(ReflectError::UnsupportedAddressSpace(other.to_string())),
    }
}

/// the leading identifier of a sampler or texture type
pub fn texture_sampler_kind(type_text: &str) -> Result<String> {
    TEXTURE_SAMPLER_TYPE
        .captures(type_text)
        .and_then(|captures| captures.get(1))
        .map(|kind| kind.as_str().to_string())
        .ok_or_else(|| ReflectError::UnsupportedType(type_text.to_string()))
}

/// the bindings of one group, indexed by binding number
///
/// unused binding numbers below the highest one are `None`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindGroup {
    slots: Vec<Option<Binding>>,
}

impl BindGroup {
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[Option<Binding>] {
        &self.slots
    }

    /// fails for indices past the highest declared binding
    pub fn binding(&self, index: usize) -> Result<Option<&Binding>> {
        self.slots
            .get(index)
            .map(Option::as_ref)
            .ok_or(ReflectError::BindingOutOfRange {
                index,
                len: self.slots.len(),
            })
    }

    /// the declared bindings, skipping gaps
    pub fn bindings(&self) -> impl Iterator<Item = &Binding> {
        self.slots.iter().flatten()
    }

    /// replaces whatever sat at `binding.binding`
    pub(super) fn insert(&mut self, binding: Binding) -> Result<Option<Binding>> {
        let index = binding.binding as usize;
        grow_to_fit(&mut self.slots, index)?;
        Ok(self.slots[index].replace(binding))
    }
}

/// the highest group or binding number a sparse table will grow to
pub const MAX_SLOT_INDEX: usize = u16::MAX as usize;

/// extends `slots` with `None` until `index` is addressable; never shrinks
pub(super) fn grow_to_fit<T>(slots: &mut Vec<Option<T>>, index: usize) -> Result<()> {
    if slots.len() > index {
        return Ok(());
    }
    if index > MAX_SLOT_INDEX {
        return Err(ReflectError::IndexTooLarge {
            index,
            limit: MAX_SLOT_INDEX,
        });
    }

    slots
        .try_reserve(index + 1 - slots.len())
        .map_err(|_| ReflectError::IndexTooLarge {
            index,
            limit: MAX_SLOT_INDEX,
        })?;
    slots.resize_with(index + 1, || None);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_binding(source: &str) -> Result<Binding> {
        let tree = SyntaxTree::parse(source).unwrap();
        Binding::parse(&tree, named_children(tree.root())[0])
    }

    #[test]
    fn uniform_buffer() {
        let source = "@binding(0) @group(0) var<uniform> viewUniforms: ViewUniforms;";
        let binding = parse_binding(source).unwrap();

        assert_eq!(
            binding,
            Binding {
                binding: 0,
                group: 0,
                name: "viewUniforms".to_string(),
                binding_type: "buffer".to_string(),
                ty: "ViewUniforms".to_string(),
                access_mode: None,
            }
        );
    }

    #[test]
    fn storage_buffer() {
        let source = "@group(2) @binding(3) var<storage,read_write> storage_buffer: B;";
        let binding = parse_binding(source).unwrap();

        assert_eq!(binding.binding, 3);
        assert_eq!(binding.group, 2);
        assert_eq!(binding.name, "storage_buffer");
        assert_eq!(binding.binding_type, "buffer");
        assert_eq!(binding.ty, "B");
        assert_eq!(binding.access_mode.as_deref(), Some("read_write"));
    }

    #[test]
    fn sampler() {
        let binding = parse_binding("@binding(2) @group(0) var u_sampler: sampler;").unwrap();

        assert_eq!(binding.binding, 2);
        assert_eq!(binding.group, 0);
        assert_eq!(binding.name, "u_sampler");
        assert_eq!(binding.binding_type, "sampler");
        assert_eq!(binding.ty, "sampler");
    }

    #[test]
    fn texture() {
        for source in [
            "@binding(3) @group(1) var u_texture: texture_2d<f32>;",
            "@binding(3) @group(1) var u_texture: texture_2d <f32> ;",
        ] {
            let binding = parse_binding(source).unwrap();

            assert_eq!(binding.binding, 3);
            assert_eq!(binding.group, 1);
            assert_eq!(binding.name, "u_texture");
            assert_eq!(binding.binding_type, "texture_2d");
            assert_eq!(binding.ty, "texture_2d");
        }
    }

    #[test]
    fn non_integer_binding_is_an_error() {
        let result = parse_binding("@binding(x) @group(0) var u_sampler: sampler;");

        assert!(matches!(
            result,
            Err(ReflectError::InvalidAttributeArgument { ref attribute, ref value })
                if attribute == "binding" && value == "x"
        ));
    }

    #[test]
    fn private_address_space_is_an_error() {
        let result = parse_binding("@binding(0) @group(0) var<private> counter: Counter;");

        assert!(matches!(
            result,
            Err(ReflectError::UnsupportedAddressSpace(ref space)) if space == "private"
        ));
    }

    #[test]
    fn suffixed_integer_arguments() {
        let binding = parse_binding("@group(0u) @binding(1u) var u_sampler: sampler;").unwrap();
        assert_eq!((binding.group, binding.binding), (0, 1));

        let binding = parse_binding("@group(2i) @binding(3) var u_sampler: sampler;").unwrap();
        assert_eq!((binding.group, binding.binding), (2, 3));

        let result = parse_binding("@group(0) @binding(1f) var u_sampler: sampler;");
        assert!(matches!(
            result,
            Err(ReflectError::InvalidAttributeArgument { ref value, .. }) if value == "1f"
        ));
    }

    #[test]
    fn missing_group_is_an_error() {
        let result = parse_binding("@binding(0) var u_sampler: sampler;");

        assert!(matches!(result, Err(ReflectError::IncompleteBinding(_))));
    }

    #[test]
    fn rejects_other_declarations() {
        let result = parse_binding("struct A { a: i32, };");

        assert!(matches!(result, Err(ReflectError::WrongDeclaration { .. })));
    }

    #[test]
    fn texture_sampler_type_text() {
        assert_eq!(texture_sampler_kind("sampler").unwrap(), "sampler");
        assert_eq!(texture_sampler_kind("texture_2d<f32>").unwrap(), "texture_2d");
        assert_eq!(texture_sampler_kind("texture_2d <f32>").unwrap(), "texture_2d");
        assert!(matches!(
            texture_sampler_kind("texture_storage_2d<rgba8unorm, write>"),
            Err(ReflectError::UnsupportedType(_))
        ));
        assert!(texture_sampler_kind("array<f32, 4>").is_err());
    }

    #[test]
    fn bind_group_gaps() {
        let mut group = BindGroup::default();
        for (index, name) in [(0, "a"), (1, "b"), (2, "c"), (4, "e")] {
            group
                .insert(Binding {
                    binding: index,
                    group: 0,
                    name: name.to_string(),
                    binding_type: "sampler".to_string(),
                    ty: "sampler".to_string(),
                    access_mode: None,
                })
                .unwrap();
        }

        assert_eq!(group.len(), 5);
        assert!(group.binding(3).unwrap().is_none());
        assert_eq!(group.binding(4).unwrap().unwrap().name, "e");
        assert_eq!(group.bindings().count(), 4);
        assert!(group.bindings().all(|b| group.binding(b.binding as usize).unwrap() == Some(b)));
        assert!(matches!(
            group.binding(5),
            Err(ReflectError::BindingOutOfRange { index: 5, len: 5 })
        ));
    }

    #[test]
    fn insert_overwrites_the_slot() {
        let mut group = BindGroup::default();
        let sampler = |name: &str| Binding {
            binding: 1,
            group: 0,
            name: name.to_string(),
            binding_type: "sampler".to_string(),
            ty: "sampler".to_string(),
            access_mode: None,
        };

        assert!(group.insert(sampler("first")).unwrap().is_none());
        let replaced = group.insert(sampler("second")).unwrap().unwrap();

        assert_eq!(replaced.name, "first");
        assert_eq!(group.len(), 2);
        assert_eq!(group.binding(1).unwrap().unwrap().name, "second");
    }

    #[test]
    fn oversized_index_is_an_error() {
        let mut slots: Vec<Option<u32>> = vec![];

        assert!(matches!(
            grow_to_fit(&mut slots, 4_000_000_000),
            Err(ReflectError::IndexTooLarge { index: 4_000_000_000, .. })
        ));
        assert!(slots.is_empty());

        grow_to_fit(&mut slots, MAX_SLOT_INDEX).unwrap();
        assert_eq!(slots.len(), MAX_SLOT_INDEX + 1);
        grow_to_fit(&mut slots, 2).unwrap();
        assert_eq!(slots.len(), MAX_SLOT_INDEX + 1);
    }
}

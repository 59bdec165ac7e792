//! GraphQL SDL to [`DomainModelCollection`].

use std::collections::{HashMap, HashSet};

use graphql_parser::schema::{
    parse_schema as parse_sdl, Definition, Document, Field as GqlField, InputValue, Type,
    TypeDefinition, TypeExtension,
};
use tracing::{debug, warn};

use crate::error::{GenError, GenResult};
use crate::model::{
    DomainModel, DomainModelCollection, EnumModel, Field, OperationKind, QueryOperation,
};

/// Parse SDL text into the intermediate model.
///
/// Object and interface types become models. Fields of the query and
/// mutation root types become operations instead.
pub fn parse_schema(sdl: &str) -> GenResult<DomainModelCollection> {
    let doc = parse_sdl::<String>(sdl).map_err(|e| GenError::Parse(e.to_string()))?;

    let roots = RootTypes::from_document(&doc);
    let mut collection = DomainModelCollection::default();
    let mut seen: HashSet<String> = HashSet::new();
    let mut root_fields: HashMap<OperationKind, Vec<QueryOperation>> = HashMap::new();

    for def in &doc.definitions {
        let Definition::TypeDefinition(typedef) = def else {
            continue;
        };

        let name = type_definition_name(typedef);
        if !seen.insert(name.to_string()) {
            return Err(GenError::DuplicateType(name.to_string()));
        }

        match typedef {
            TypeDefinition::Object(obj) => {
                if let Some(kind) = roots.kind_of(&obj.name) {
                    root_fields
                        .entry(kind)
                        .or_default()
                        .extend(convert_operations(kind, &obj.fields));
                } else if roots.is_subscription(&obj.name) {
                    debug!("Skipping subscription root type {}", obj.name);
                } else {
                    collection.models.push(DomainModel::new(
                        obj.name.clone(),
                        obj.description.clone(),
                        convert_fields(&obj.fields),
                    ));
                }
            }
            TypeDefinition::Interface(iface) => {
                collection.models.push(DomainModel::new(
                    iface.name.clone(),
                    iface.description.clone(),
                    convert_fields(&iface.fields),
                ));
            }
            TypeDefinition::Enum(e) => collection.enums.push(EnumModel {
                name: e.name.clone(),
                description: e.description.clone(),
                values: e.values.iter().map(|v| v.name.clone()).collect(),
            }),
            TypeDefinition::Scalar(s) => collection.scalars.push(s.name.clone()),
            TypeDefinition::Union(u) => {
                warn!("Union type {} is not supported and will be rendered as JSON", u.name)
            }
            TypeDefinition::InputObject(input) => {
                debug!("Input type {} is only used as an argument type", input.name)
            }
        }
    }

    // Extensions may precede their definition, so apply them last.
    for def in &doc.definitions {
        let Definition::TypeExtension(ext) = def else {
            continue;
        };

        match ext {
            TypeExtension::Object(obj) => {
                if let Some(kind) = roots.kind_of(&obj.name) {
                    root_fields
                        .entry(kind)
                        .or_default()
                        .extend(convert_operations(kind, &obj.fields));
                } else if roots.is_subscription(&obj.name) {
                    debug!("Skipping extension of subscription root type {}", obj.name);
                } else {
                    extend_model(&mut collection, &obj.name, convert_fields(&obj.fields))?;
                }
            }
            TypeExtension::Interface(iface) => {
                extend_model(&mut collection, &iface.name, convert_fields(&iface.fields))?;
            }
            TypeExtension::Enum(e) => {
                let target = collection
                    .enums
                    .iter_mut()
                    .find(|existing| existing.name == e.name)
                    .ok_or_else(|| undefined_extension(&e.name))?;
                target.values.extend(e.values.iter().map(|v| v.name.clone()));
            }
            _ => debug!("Ignoring unsupported type extension"),
        }
    }

    for kind in [OperationKind::Query, OperationKind::Mutation] {
        if let Some(ops) = root_fields.remove(&kind) {
            collection.operations.extend(ops);
        }
    }

    debug!(
        models = collection.models.len(),
        enums = collection.enums.len(),
        operations = collection.operations.len(),
        "Parsed schema"
    );

    Ok(collection)
}

/// Names of the root operation types.
///
/// A `schema { ... }` block lists the roots exhaustively: a root it leaves
/// out does not exist, whatever the type is called. Without a block the
/// conventional `Query`, `Mutation` and `Subscription` names apply.
struct RootTypes {
    query: Option<String>,
    mutation: Option<String>,
    subscription: Option<String>,
}

impl RootTypes {
    fn from_document(doc: &Document<'_, String>) -> Self {
        let schema = doc.definitions.iter().find_map(|def| match def {
            Definition::SchemaDefinition(schema) => Some(schema),
            _ => None,
        });

        match schema {
            Some(schema) => Self {
                query: schema.query.clone(),
                mutation: schema.mutation.clone(),
                subscription: schema.subscription.clone(),
            },
            None => Self {
                query: Some("Query".to_string()),
                mutation: Some("Mutation".to_string()),
                subscription: Some("Subscription".to_string()),
            },
        }
    }

    fn kind_of(&self, name: &str) -> Option<OperationKind> {
        if self.query.as_deref() == Some(name) {
            Some(OperationKind::Query)
        } else if self.mutation.as_deref() == Some(name) {
            Some(OperationKind::Mutation)
        } else {
            None
        }
    }

    fn is_subscription(&self, name: &str) -> bool {
        self.subscription.as_deref() == Some(name)
    }
}

fn type_definition_name<'d>(typedef: &'d TypeDefinition<'_, String>) -> &'d str {
    match typedef {
        TypeDefinition::Scalar(t) => &t.name,
        TypeDefinition::Object(t) => &t.name,
        TypeDefinition::Interface(t) => &t.name,
        TypeDefinition::Union(t) => &t.name,
        TypeDefinition::Enum(t) => &t.name,
        TypeDefinition::InputObject(t) => &t.name,
    }
}

fn extend_model(
    collection: &mut DomainModelCollection,
    name: &str,
    fields: Vec<Field>,
) -> GenResult<()> {
    let model = collection
        .models
        .iter_mut()
        .find(|m| m.name() == name)
        .ok_or_else(|| undefined_extension(name))?;
    model.extend(fields);
    Ok(())
}

fn undefined_extension(name: &str) -> GenError {
    GenError::Parse(format!("extension of undefined type `{}`", name))
}

/// Base type plus wrapper flags of a (possibly wrapped) GraphQL type.
struct TypeShape {
    base: String,
    required: bool,
    list: bool,
    item_required: bool,
}

/// Strip `NonNull` and `List` wrappers down to the named type.
///
/// Nested lists collapse onto a single list level.
fn unwrap_type(ty: &Type<'_, String>) -> TypeShape {
    match ty {
        Type::NamedType(name) => TypeShape {
            base: name.clone(),
            required: false,
            list: false,
            item_required: false,
        },
        Type::NonNullType(inner) => TypeShape {
            required: true,
            ..unwrap_type(inner)
        },
        Type::ListType(inner) => {
            let item = unwrap_type(inner);
            TypeShape {
                base: item.base,
                required: false,
                list: true,
                item_required: item.required,
            }
        }
    }
}

fn to_field(name: &str, ty: &Type<'_, String>, description: Option<&String>) -> Field {
    let shape = unwrap_type(ty);
    Field::new(
        name,
        shape.base,
        shape.required,
        shape.list,
        shape.item_required,
    )
    .with_description(description.cloned())
}

fn convert_fields(fields: &[GqlField<'_, String>]) -> Vec<Field> {
    fields
        .iter()
        .map(|f| to_field(&f.name, &f.field_type, f.description.as_ref()))
        .collect()
}

fn convert_arguments(args: &[InputValue<'_, String>]) -> Vec<Field> {
    args.iter()
        .map(|a| to_field(&a.name, &a.value_type, a.description.as_ref()))
        .collect()
}

fn convert_operations(kind: OperationKind, fields: &[GqlField<'_, String>]) -> Vec<QueryOperation> {
    fields
        .iter()
        .map(|f| QueryOperation {
            kind,
            field: to_field(&f.name, &f.field_type, f.description.as_ref()),
            arguments: convert_arguments(&f.arguments),
        })
        .collect()
}

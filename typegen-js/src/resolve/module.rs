use super::error_at;
use super::Closure;
use super::EvalScope;
use super::ResolutionContext;
use super::Value;
use super::Visited;
use crate::error::ResolveErrorKind;
use crate::error::ResolveResult;
use scope_js::ast::node::Node;
use scope_js::ast::stmt::ExportName;
use scope_js::ast::stmt::ExportNames;
use scope_js::ast::stmt::Stmt;
use scope_js::loc::Loc;
use scope_js::module::Module;
use std::sync::Arc;
use tracing::debug;
use tracing::debug_span;

impl ResolutionContext<'_> {
  /// Resolves and loads `specifier` as imported from `importer`, binding its scopes. Cached per context.
  pub(super) fn load_module(&self, specifier: &str, importer: &Module) -> Result<Arc<Module>, ResolveErrorKind> {
    self.check_timeout()?;
    let id = self.host.resolve(specifier, &importer.id)?;
    if let Some(module) = self.modules.lock().get(&id) {
      return Ok(module.clone());
    };
    let _span = debug_span!("load_module", module = %id).entered();
    let program = self.host.load(&id)?;
    let module = Module::new(id.clone(), program);
    self.modules.lock().entry(id).or_insert(module.clone());
    Ok(module)
  }

  /// Resolves the value `target` exports as `name`.
  ///
  /// `site` is where the export is being requested from, used to place not-found and cycle errors.
  pub(super) fn resolve_export(
    &self,
    target: &Arc<Module>,
    name: &str,
    site: (&Module, Loc),
    visited: &Visited,
  ) -> ResolveResult<Value> {
    let (site_module, site_loc) = site;
    self.check_timeout().map_err(|k| error_at(site_module, site_loc, k))?;
    let _depth = self.enter_depth().map_err(|k| error_at(site_module, site_loc, k))?;
    let visited = visited
      .enter_export((target.id.clone(), name.to_string()))
      .ok_or_else(|| {
        error_at(site_module, site_loc, ResolveErrorKind::CircularReExport {
          name: name.to_string(),
          module: target.id.to_string(),
        })
      })?;
    let module_scope = EvalScope::module_scope(target.clone());

    if name == "default" {
      for stmt in target.body().iter() {
        match stmt.stx.as_ref() {
          Stmt::ExportDefaultExpr(export) => return self.eval(&export.stx.expression, &module_scope, &visited),
          Stmt::FuncDecl(decl) if decl.stx.export_default => {
            return Ok(Value::Func(Closure {
              func: decl.stx.function.clone(),
              module: target.clone(),
              env: None,
            }));
          }
          _ => {}
        };
      }
    };

    // Any top-level binding of that name, whether or not it is exported.
    if let Some(variable) = target.scopes.get(target.scopes.root()).variable(name) {
      return self.eval_variable(variable, target.program.top_level.loc, &module_scope, &visited);
    };

    if let Some((spec, from)) = find_export_specifier(target, name) {
      return match from {
        Some(from) => {
          let source = self.load_module(from, target).map_err(|k| error_at(target, spec.loc, k))?;
          self.resolve_export(&source, &spec.stx.target, (target.as_ref(), spec.loc), &visited)
        }
        None => {
          let variable = target
            .scopes
            .get(target.scopes.root())
            .variable(&spec.stx.target)
            .ok_or_else(|| error_at(target, spec.loc, ResolveErrorKind::UnboundIdentifier(spec.stx.target.clone())))?;
          self.eval_variable(variable, spec.loc, &module_scope, &visited)
        }
      };
    };

    for stmt in target.body().iter() {
      let Stmt::ExportList(export) = stmt.stx.as_ref() else {
        continue;
      };
      let (ExportNames::All(None), Some(from)) = (&export.stx.names, &export.stx.from) else {
        continue;
      };
      let source = self.load_module(from, target).map_err(|k| error_at(target, export.loc, k))?;
      match self.resolve_export(&source, name, (target.as_ref(), export.loc), &visited) {
        Ok(value) => return Ok(value),
        Err(err) if matches!(
          err.kind,
          ResolveErrorKind::ExportNotFound { .. } | ResolveErrorKind::CircularReExport { .. }
        ) =>
        {
          debug!(module = %source.id, name, error = %err, "wildcard re-export does not provide name");
        }
        Err(err) => return Err(err),
      };
    }

    Err(error_at(site_module, site_loc, ResolveErrorKind::ExportNotFound {
      name: name.to_string(),
      module: target.id.to_string(),
    }))
  }
}

/// Last `export { target as name }` specifier exporting `name`, with its `from` source if it's a re-export.
fn find_export_specifier<'m>(module: &'m Module, name: &str) -> Option<(&'m Node<ExportName>, Option<&'m str>)> {
  module
    .body()
    .iter()
    .filter_map(|stmt| match stmt.stx.as_ref() {
      Stmt::ExportList(export) if !export.stx.type_only => match &export.stx.names {
        ExportNames::Specific(names) => Some((names, export.stx.from.as_deref())),
        ExportNames::All(_) => None,
      },
      _ => None,
    })
    .flat_map(|(names, from)| names.iter().map(move |n| (n, from)))
    .filter(|(n, _)| n.stx.alias == name)
    .last()
}

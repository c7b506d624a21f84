use std::collections::HashMap;

use crate::dict::catalog::{Bootstrap, BootstrapNames, NativeCatalog, VariableTable};
use crate::dict::compile_error::{CompileError, Diagnostic};
use crate::dict::entry::DictionaryEntry;
use crate::dict::pack::pack;
use crate::lexer::Lexer;
use crate::token::Token;

/// How a plain token or `%NAME` is matched against the dictionary when
/// more than one word answers to the same name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResolveOrder {
    /// Scan natives then compiled words, front to back (the historical
    /// behavior: the first declaration wins)
    FirstDeclared,
    /// Scan compiled words then natives, back to front, so a
    /// redefinition shadows the original
    LastDeclared,
}

/// A `%NAME` that matched nothing at its point of use; patched after the
/// last definition, once the whole constant space is known.
#[derive(Debug)]
struct GlobalFixup {
    /// position in the compiled list
    entry: usize,
    /// unit position in the final code array (flags unit included)
    pos: usize,
    name: String,
}

/// All state that accumulates across one compilation run. Created once,
/// threaded by `&mut`; nothing here is global.
pub struct CompilerState {
    catalog: NativeCatalog,
    variables: VariableTable,
    bootstrap: Bootstrap,
    order: ResolveOrder,
    compiled: Vec<DictionaryEntry>,
    pending: Vec<GlobalFixup>,
    diagnostics: Vec<Diagnostic>,
}

/// Per-definition scratch state; discarded once the entry is appended.
#[derive(Default)]
struct Context {
    emitted: Vec<u16>,
    labels: HashMap<String, usize>,
    pending_labels: Vec<(usize, String)>,
    comment_depth: u32,
    first_comment_done: bool,
    inferred_constant: Option<String>,
    doc: String,
    flags: u16,
}

impl CompilerState {
    /// Bootstrap indices are resolved here, before any definition can
    /// compile; a native catalog missing one of them is unusable.
    pub fn new(
        catalog: NativeCatalog,
        variables: VariableTable,
        names: &BootstrapNames,
        order: ResolveOrder,
    ) -> Result<Self, CompileError> {
        let bootstrap = Bootstrap::resolve(&catalog, names)?;
        Ok(CompilerState {
            catalog,
            variables,
            bootstrap,
            order,
            compiled: Vec::new(),
            pending: Vec::new(),
            diagnostics: Vec::new(),
        })
    }

    pub fn bootstrap(&self) -> &Bootstrap {
        &self.bootstrap
    }

    #[allow(dead_code)]
    pub fn compiled(&self) -> &[DictionaryEntry] {
        &self.compiled
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_parts(
        self,
    ) -> (
        NativeCatalog,
        VariableTable,
        Vec<DictionaryEntry>,
        Vec<Diagnostic>,
    ) {
        (self.catalog, self.variables, self.compiled, self.diagnostics)
    }

    /// The dictionary-global index the next compiled entry will receive.
    fn next_index(&self) -> u16 {
        (self.catalog.len() + self.compiled.len()) as u16
    }

    fn find_word(&self, name: &str) -> Option<u16> {
        let native_count = self.catalog.len() as u16;
        match self.order {
            ResolveOrder::FirstDeclared => self.catalog.find_by_name(name).or_else(|| {
                self.compiled
                    .iter()
                    .position(|e| e.name == name)
                    .map(|i| i as u16 + native_count)
            }),
            ResolveOrder::LastDeclared => self
                .compiled
                .iter()
                .rposition(|e| e.name == name)
                .map(|i| i as u16 + native_count)
                .or_else(|| self.catalog.find_by_name_rev(name)),
        }
    }

    fn find_constant(&self, name: &str) -> Option<u16> {
        let native_count = self.catalog.len() as u16;
        match self.order {
            ResolveOrder::FirstDeclared => self.catalog.find_by_constant(name).or_else(|| {
                self.compiled
                    .iter()
                    .position(|e| e.constant_id() == name)
                    .map(|i| i as u16 + native_count)
            }),
            ResolveOrder::LastDeclared => self
                .compiled
                .iter()
                .rposition(|e| e.constant_id() == name)
                .map(|i| i as u16 + native_count)
                .or_else(|| {
                    self.catalog
                        .words()
                        .iter()
                        .rposition(|w| w.constant == name)
                        .map(|i| i as u16)
                }),
        }
    }

    /// Compile every definition of the definitions section, then patch
    /// the cross-definition forward references.
    pub fn compile_section(&mut self, definitions: &[String]) -> Result<(), CompileError> {
        for def in definitions {
            self.compile_definition(def)?;
        }
        self.resolve_pending();
        Ok(())
    }

    /// Compile one definition and append its entry. Resolution problems
    /// downgrade to diagnostics; only string packing can fail the run.
    pub fn compile_definition(&mut self, raw: &str) -> Result<(), CompileError> {
        let tokens = Lexer::new(raw).tokenize();

        match tokens.first() {
            Some(Token::WordOrLiteral(t)) if t == ":" => {}
            // warn but keep compiling; the name is still expected second
            _ => self
                .diagnostics
                .push(Diagnostic::malformed_header(raw, "missing ':' marker")),
        }
        let name = match tokens.get(1) {
            Some(token) => token.text(),
            None => {
                self.diagnostics
                    .push(Diagnostic::malformed_header(raw, "missing word name"));
                return Ok(());
            }
        };

        let mut ctx = Context::default();

        for token in &tokens[2..] {
            if ctx.comment_depth > 0 {
                self.compile_comment_token(&mut ctx, token);
                continue;
            }
            match token {
                Token::CommentOpen => ctx.comment_depth = 1,
                // stray close at depth 0; drop it
                Token::CommentClose => {}
                Token::Flag(bit) => ctx.flags |= bit,
                Token::Recurse => ctx.emitted.push(self.next_index()),
                Token::ForwardRef(fwd) => self.compile_forward_ref(&mut ctx, fwd),
                Token::VariableRef(var) => self.compile_variable_ref(&mut ctx, &name, var),
                Token::LabelDef(label) => {
                    ctx.labels.insert(label.clone(), ctx.emitted.len());
                }
                Token::LabelUse(label) => {
                    ctx.pending_labels.push((ctx.emitted.len(), label.clone()));
                    ctx.emitted.push(0);
                }
                Token::StringLit(text) => {
                    ctx.emitted.push(self.bootstrap.lit_string);
                    ctx.emitted.extend(pack(text.as_bytes())?);
                }
                Token::WordOrLiteral(w) => {
                    if w == ";" {
                        break;
                    }
                    self.compile_plain(&mut ctx, &name, w);
                }
            }
        }

        self.finalize(ctx, name);
        Ok(())
    }

    fn compile_comment_token(&mut self, ctx: &mut Context, token: &Token) {
        match token {
            Token::CommentOpen => ctx.comment_depth += 1,
            Token::CommentClose => {
                ctx.comment_depth -= 1;
                if ctx.comment_depth == 0 && !ctx.first_comment_done {
                    ctx.first_comment_done = true;
                }
            }
            other => {
                let text = other.text();
                if let Some(constant) = text.strip_prefix('\'') {
                    if !constant.is_empty() {
                        ctx.inferred_constant = Some(constant.to_string());
                        return;
                    }
                }
                if ctx.comment_depth == 1 && !ctx.first_comment_done {
                    if !ctx.doc.is_empty() {
                        ctx.doc.push(' ');
                    }
                    ctx.doc.push_str(&text);
                }
            }
        }
    }

    fn compile_forward_ref(&mut self, ctx: &mut Context, name: &str) {
        if let Some(index) = self.find_constant(name) {
            ctx.emitted.push(index);
            return;
        }
        if ctx.inferred_constant.as_deref() == Some(name) {
            // the word refers to itself by the constant it is about to get
            ctx.emitted.push(self.next_index());
            return;
        }
        // maybe a later definition declares it; patch after the run
        self.pending.push(GlobalFixup {
            entry: self.compiled.len(),
            // +1 for the flags unit prepended at finalize
            pos: ctx.emitted.len() + 1,
            name: name.to_string(),
        });
        ctx.emitted.push(0);
    }

    /// Slots 0 and 1 ride the pre-existing false/one literal words; only
    /// higher slots pay for a generic literal push.
    fn compile_variable_ref(&mut self, ctx: &mut Context, word: &str, var: &str) {
        ctx.emitted.push(self.bootstrap.push_var);
        match self.variables.find(var) {
            Some(0) => ctx.emitted.push(self.bootstrap.lit_false),
            Some(1) => ctx.emitted.push(self.bootstrap.lit_one),
            Some(index) => {
                ctx.emitted.push(self.bootstrap.lit_short);
                ctx.emitted.push(index);
            }
            None => {
                self.diagnostics
                    .push(Diagnostic::unresolved_word(word, &format!("${}", var)));
                ctx.emitted.push(0);
            }
        }
    }

    fn compile_plain(&mut self, ctx: &mut Context, word: &str, text: &str) {
        if let Some(index) = self.find_word(text) {
            ctx.emitted.push(index);
            return;
        }
        if let Ok(value) = text.parse::<i32>() {
            let value = value as u32;
            // a 32-bit immediate always follows the wide-integer word
            if ctx.emitted.last() == Some(&self.bootstrap.wide_int) {
                ctx.emitted.push((value >> 16) as u16);
            }
            ctx.emitted.push((value & 0xFFFF) as u16);
            return;
        }
        self.diagnostics
            .push(Diagnostic::unresolved_word(word, text));
        ctx.emitted.push(0);
    }

    /// Patch label uses, prepend the flags unit, append the entry.
    fn finalize(&mut self, mut ctx: Context, name: String) {
        for (pos, label) in std::mem::take(&mut ctx.pending_labels) {
            match ctx.labels.get(&label) {
                Some(&target) => {
                    // relative offset from the use site to the label
                    ctx.emitted[pos] = (target as i64 - pos as i64) as i16 as u16;
                }
                None => {
                    self.diagnostics
                        .push(Diagnostic::unresolved_label(&name, &label));
                }
            }
        }

        let mut code = Vec::with_capacity(ctx.emitted.len() + 1);
        code.push(ctx.flags);
        code.extend(ctx.emitted);

        self.compiled.push(DictionaryEntry {
            name,
            constant: ctx.inferred_constant,
            flags: ctx.flags,
            code: Some(code),
            doc: if ctx.doc.is_empty() {
                None
            } else {
                Some(ctx.doc)
            },
        });
    }

    /// Patch the forward references that pointed past their definition.
    /// Names still unknown after the whole run are real errors.
    pub fn resolve_pending(&mut self) {
        for fixup in std::mem::take(&mut self.pending) {
            let resolved = self.find_constant(&fixup.name);
            match resolved {
                Some(index) => {
                    if let Some(code) = self.compiled[fixup.entry].code.as_mut() {
                        code[fixup.pos] = index;
                    }
                }
                None => {
                    let word = self.compiled[fixup.entry].name.clone();
                    self.diagnostics
                        .push(Diagnostic::unresolved_forward(&word, &fixup.name));
                }
            }
        }
    }
}

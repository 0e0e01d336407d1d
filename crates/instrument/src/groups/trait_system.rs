use std::sync::Arc;

use hookwatch_diagnostics::{Diagnostics, LogCategory};
use hookwatch_host::HostValue;
use hookwatch_intercept::{HookError, HookSpec, MemberTarget, Sampler};

use super::GroupEnv;
use crate::classes::{CHARACTER_SYSTEM_MODULE, CHARACTER_SYSTEM_TYPE, CLASSES_PROPERTY, ClassView, read_classes};
use crate::reflect::contains_ignore_case;

fn target(member: &str) -> MemberTarget {
	MemberTarget::method(CHARACTER_SYSTEM_TYPE, member).in_module(CHARACTER_SYSTEM_MODULE)
}

pub(super) fn specs(env: &GroupEnv) -> Vec<HookSpec> {
	let marker: Arc<str> = env.config.probes.class_marker.as_str().into();
	let sampler = Arc::new(Sampler::new(env.config.sampling.warmup, env.config.sampling.every));
	vec![
		classes_getter(env.diagnostics.clone(), sampler, marker.clone()),
		load_classes(env.diagnostics.clone(), marker.clone()),
		get_class(env.diagnostics.clone(), marker),
	]
}

/// The class list is read constantly by other mods, so only a sample is inspected.
fn classes_getter(d: Arc<Diagnostics>, sampler: Arc<Sampler>, marker: Arc<str>) -> HookSpec {
	let target = MemberTarget::getter(CHARACTER_SYSTEM_TYPE, CLASSES_PROPERTY).in_module(CHARACTER_SYSTEM_MODULE);
	HookSpec::after(target, move |call| {
		if call.result.is_null() {
			return Ok(());
		}
		let Some(n) = sampler.tick() else {
			return Ok(());
		};
		let Some(classes) = read_classes(call.result)? else {
			return Ok(());
		};

		d.debug(format_args!("CharacterSystem.{CLASSES_PROPERTY} accessed (#{n})"));
		d.debug(format_args!("  Returned {} character classes", classes.len()));
		let marked = classes.iter().filter(|c| c.is_marked(&marker)).count();
		if marked > 0 {
			d.debug(format_args!("  '{marker}' classes visible: YES ({marked} classes)"));
		} else {
			d.warn(format_args!("  '{marker}' classes visible: NO - other mods may not see our traits!"));
		}
		Ok(())
	})
}

fn load_classes(d: Arc<Diagnostics>, marker: Arc<str>) -> HookSpec {
	HookSpec::after(target("LoadCharacterClasses"), move |call| {
		d.notify("CharacterSystem.LoadCharacterClasses completed");
		let Some(system) = call.instance else {
			return Err(HookError::Failed("LoadCharacterClasses ran without an instance".into()));
		};
		let list = system.property(CLASSES_PROPERTY)?.unwrap_or_default();
		let Some(classes) = read_classes(&list)? else {
			d.error(format_args!("{CLASSES_PROPERTY} is NULL after loading!"));
			return Ok(());
		};

		d.notify(format_args!("Total classes loaded: {}", classes.len()));
		let marked: Vec<&ClassView> = classes.iter().filter(|c| c.code_marked(&marker)).collect();
		for class in &marked {
			d.debug(format_args!("  - {}: {} traits", class.code(), class.traits.len()));
			for t in &class.traits {
				d.verbose(format_args!("    * {t}"));
			}
		}
		d.log(LogCategory::TraitSystem, format_args!("Classes loaded: {} ({} marked '{marker}')", classes.len(), marked.len()));

		if marked.is_empty() {
			d.warn(format_args!("No '{marker}' character classes found!"));
			d.warn("  This indicates a load order or asset loading problem");
		} else {
			d.notify(format_args!("'{marker}' character classes found: {}", marked.len()));
		}
		Ok(())
	})
}

/// Lookup by code. Only marked codes are of interest.
fn get_class(d: Arc<Diagnostics>, marker: Arc<str>) -> HookSpec {
	let target = target("GetClass").signature(["System.String"]);
	let (before_d, before_marker) = (d.clone(), marker.clone());
	HookSpec::both(
		target,
		move |call| {
			if let Some(code) = marked_code(call.arg(0), &before_marker) {
				before_d.debug(format_args!("GetClass called for '{before_marker}' class: {code}"));
			}
			Ok(())
		},
		move |call| {
			let Some(code) = marked_code(call.arg(0), &marker) else {
				return Ok(());
			};
			match ClassView::read(call.result)? {
				Some(class) => d.debug(format_args!("GetClass returned: {} ({} traits)", class.code(), class.traits.len())),
				None => d.warn(format_args!("GetClass returned NULL for: {code}")),
			}
			Ok(())
		},
	)
}

fn marked_code<'a>(arg: Option<&'a HostValue>, marker: &str) -> Option<&'a str> {
	arg.and_then(HostValue::as_str).filter(|code| !code.is_empty() && contains_ignore_case(code, marker))
}

//! Per-client token bucket under `src/rate-limit/`.

use std::path::{Path, PathBuf};

use crudforge_core::{FileRules, GeneratedFile};

fn rate_limit(base: &Path, file: &str) -> PathBuf {
    base.join("src").join("rate-limit").join(file)
}

/// `src/rate-limit/token-bucket.ts`: the limiter itself, framework free.
pub struct TokenBucketTs;

impl GeneratedFile for TokenBucketTs {
    fn path(&self, base: &Path) -> PathBuf {
        rate_limit(base, "token-bucket.ts")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        r#"interface Bucket {
  tokens: number;
  updatedAt: number;
}

/** Buckets of `capacity` tokens refilled at `refillPerSec`, one per client key. */
export class TokenBucketLimiter {
  private readonly buckets = new Map<string, Bucket>();

  constructor(
    private readonly capacity: number,
    private readonly refillPerSec: number,
  ) {}

  /** Takes a token for `key`; false when the bucket is empty. */
  tryAcquire(key: string, now: number = Date.now()): boolean {
    const bucket = this.buckets.get(key) ?? { tokens: this.capacity, updatedAt: now };
    const elapsed = Math.max(0, now - bucket.updatedAt) / 1000;
    bucket.tokens = Math.min(this.capacity, bucket.tokens + elapsed * this.refillPerSec);
    bucket.updatedAt = now;
    this.buckets.set(key, bucket);
    if (bucket.tokens < 1) {
      return false;
    }
    bucket.tokens -= 1;
    return true;
  }
}
"#
        .to_string()
    }
}

/// `src/rate-limit/throttle.guard.ts`: answers 429 once a client runs dry.
pub struct ThrottleGuardTs;

impl GeneratedFile for ThrottleGuardTs {
    fn path(&self, base: &Path) -> PathBuf {
        rate_limit(base, "throttle.guard.ts")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        r#"import { CanActivate, ExecutionContext, HttpException, HttpStatus, Injectable, Logger } from '@nestjs/common';
import { Request } from 'express';

import { loadConfig } from '../config';
import { TokenBucketLimiter } from './token-bucket';

@Injectable()
export class ThrottleGuard implements CanActivate {
  private readonly logger = new Logger(ThrottleGuard.name);
  private readonly limiter: TokenBucketLimiter;

  constructor() {
    const config = loadConfig();
    this.limiter = new TokenBucketLimiter(config.rateLimitCapacity, config.rateLimitRefillPerSec);
  }

  canActivate(context: ExecutionContext): boolean {
    const request = context.switchToHttp().getRequest<Request>();
    const key = request.ip ?? 'unknown';
    if (!this.limiter.tryAcquire(key)) {
      this.logger.warn(`rate limit exceeded for ${key}`);
      throw new HttpException('too many requests', HttpStatus.TOO_MANY_REQUESTS);
    }
    return true;
  }
}
"#
        .to_string()
    }
}
